mod error;
mod local_storage;
mod memory_storage;

pub use error::StorageError;
pub use local_storage::LocalStorageService;
pub use memory_storage::MemoryStorageService;

use std::sync::Arc;

use crate::{
    application::services::StorageService,
    domain::config::local::{LocalConfig, StorageProvider},
};

pub async fn create_storage_service(
    config: &LocalConfig,
) -> Result<Arc<dyn StorageService>, StorageError> {
    match config.storage {
        StorageProvider::Filesystem => {
            let service = LocalStorageService::new(&config.upload_dir).await?;
            Ok(Arc::new(service))
        }
        StorageProvider::Memory => Ok(Arc::new(MemoryStorageService::new())),
    }
}
