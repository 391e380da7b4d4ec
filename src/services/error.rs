use std::io;

use thiserror::Error;

use crate::application::error::ApplicationError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    /// Maps an I/O failure for `file_name`, keeping "no such file" distinct.
    pub fn for_file(file_name: &str, error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(file_name.to_string())
        } else {
            StorageError::Io(error)
        }
    }
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(_) => ApplicationError::NotFound,
            StorageError::Io(e) => ApplicationError::InternalError(format!("Storage error: {}", e)),
            StorageError::LockPoisoned => {
                ApplicationError::InternalError("Storage error: lock poisoned".to_string())
            }
        }
    }
}
