use async_trait::async_trait;

use crate::{
    application::error::ApplicationError,
    domain::models::file::{FileReader, StoredFile},
};

/// Byte storage keyed by file name. Implementations overwrite on repeated saves
/// and report a missing name as `ApplicationError::NotFound`.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Drains `content` completely and stores it under `file_name`.
    async fn save(&self, file_name: &str, content: &mut FileReader) -> Result<(), ApplicationError>;
    async fn load(&self, file_name: &str) -> Result<StoredFile, ApplicationError>;
    async fn clear(&self) -> Result<(), ApplicationError>;
}
