use std::{collections::HashMap, io::Cursor, sync::Mutex};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::{
    application::{error::ApplicationError, services::StorageService},
    domain::models::file::{FileReader, StoredFile},
    services::error::StorageError,
};

/// Keeps whole files in process memory. Only suitable for small files and tests.
#[derive(Default)]
pub struct MemoryStorageService {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorageService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageService for MemoryStorageService {
    async fn save(&self, file_name: &str, content: &mut FileReader) -> Result<(), ApplicationError> {
        // Drain before locking so the guard never spans an await.
        let mut buf = Vec::new();
        content
            .read_to_end(&mut buf)
            .await
            .map_err(StorageError::from)?;

        debug!(file_name, bytes = buf.len(), "File buffered in memory");
        self.files
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(file_name.to_string(), buf);
        Ok(())
    }

    async fn load(&self, file_name: &str) -> Result<StoredFile, ApplicationError> {
        let content = self
            .files
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .get(file_name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(file_name.to_string()))?;

        let size = content.len() as u64;
        Ok(StoredFile::new(Box::new(Cursor::new(content)), file_name, size))
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        self.files
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        Ok(())
    }
}
