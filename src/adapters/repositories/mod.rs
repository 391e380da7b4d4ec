mod memory_token_repository;
mod pg_token_repository;
mod redis_token_repository;
mod sqlite_token_repository;

pub use memory_token_repository::MemoryTokenRepository;
pub use pg_token_repository::PgTokenRepository;
pub use redis_token_repository::RedisTokenRepository;
pub use sqlite_token_repository::SqliteTokenRepository;

use std::sync::Arc;

use crate::{
    application::{error::ApplicationError, repositories::token_repository::TokenRepository},
    domain::config::local::RegistryProvider,
};

/// A unique-index violation means a concurrent writer claimed the token first.
pub(crate) fn map_insert_error(error: sqlx::Error) -> ApplicationError {
    match error {
        sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
            ApplicationError::TokenConflict
        }
        other => ApplicationError::DatabaseError(other.to_string()),
    }
}

pub async fn create_token_repository(
    provider: &RegistryProvider,
) -> Result<Arc<dyn TokenRepository>, ApplicationError> {
    match provider {
        RegistryProvider::Memory => Ok(Arc::new(MemoryTokenRepository::new())),
        RegistryProvider::Sqlite(url) => Ok(Arc::new(SqliteTokenRepository::connect(url).await?)),
        RegistryProvider::Postgres(url) => Ok(Arc::new(PgTokenRepository::connect(url).await?)),
        RegistryProvider::Redis(url) => Ok(Arc::new(RedisTokenRepository::connect(url).await?)),
    }
}
