pub mod file_manager;
pub mod storage_service;
pub mod token_generator;

pub use file_manager::FileManager;
pub use storage_service::StorageService;
pub use token_generator::{RandomTokenGenerator, TokenGenerator};
