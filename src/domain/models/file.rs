use std::{fmt, path::Path};

use tokio::io::AsyncRead;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Longest identifier accepted, in bytes. Matches the registry's
/// `filename VARCHAR(255)` column and common filesystem name limits.
pub const MAX_FILE_NAME_LEN: usize = 255;

pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;

/// A file handed back by a storage backend: an open reader over its bytes plus
/// what the HTTP layer needs to describe it.
pub struct StoredFile {
    pub reader: FileReader,
    pub file_name: String,
    pub size: u64,
    pub mime_type: String,
}

impl StoredFile {
    pub fn new(reader: FileReader, file_name: &str, size: u64) -> Self {
        Self {
            reader,
            file_name: file_name.to_string(),
            size,
            mime_type: mime_type_for(file_name),
        }
    }
}

impl fmt::Debug for StoredFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredFile")
            .field("file_name", &self.file_name)
            .field("size", &self.size)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// Guesses the content type from the extension, falling back to generic binary.
pub fn mime_type_for(file_name: &str) -> String {
    mime_guess::from_path(Path::new(file_name))
        .first_raw()
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}

/// Identifiers become file names under the storage root, so anything that could
/// address a different path is refused.
pub fn is_valid_file_name(file_name: &str) -> bool {
    !(file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.len() > MAX_FILE_NAME_LEN
        || file_name.contains(['/', '\\', '\0']))
}
