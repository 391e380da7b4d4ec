use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

use crate::{
    application::{error::ApplicationError, services::StorageService},
    domain::models::file::{FileReader, StoredFile},
    services::error::StorageError,
};

/// Stores each file as a regular file named after its identifier under `root`.
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    /// Creates `root` (and parents) if missing.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!(root = %root.display(), "Local storage ready");
        Ok(Self { root })
    }

    fn file_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn save(&self, file_name: &str, content: &mut FileReader) -> Result<(), ApplicationError> {
        let path = self.file_path(file_name);

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::for_file(file_name, e))?;
        let written = tokio::io::copy(content, &mut file)
            .await
            .map_err(StorageError::from)?;
        file.flush().await.map_err(StorageError::from)?;

        debug!(path = %path.display(), bytes = written, "File written");
        Ok(())
    }

    async fn load(&self, file_name: &str) -> Result<StoredFile, ApplicationError> {
        let path = self.file_path(file_name);

        let file = fs::File::open(&path)
            .await
            .map_err(|e| StorageError::for_file(file_name, e))?;
        let metadata = file.metadata().await.map_err(StorageError::from)?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(file_name.to_string()).into());
        }

        Ok(StoredFile::new(Box::new(file), file_name, metadata.len()))
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        let mut entries = fs::read_dir(&self.root).await.map_err(StorageError::from)?;
        let mut removed = 0usize;

        while let Some(entry) = entries.next_entry().await.map_err(StorageError::from)? {
            if entry.file_type().await.map_err(StorageError::from)?.is_file() {
                fs::remove_file(entry.path())
                    .await
                    .map_err(StorageError::from)?;
                removed += 1;
            }
        }

        info!(root = %self.root.display(), removed, "Local storage cleared");
        Ok(())
    }
}
