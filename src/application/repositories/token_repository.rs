use crate::application::error::ApplicationError;
use async_trait::async_trait;

#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Binds `token` to `file_name`.
    ///
    /// # Returns
    /// - Err(TokenConflict) if the token is already bound; the existing binding is left untouched
    /// - Err(DatabaseError) if the backend could not be reached
    async fn record(&self, token: &str, file_name: &str) -> Result<(), ApplicationError>;

    /// Looks up the file name bound to `token`. An unbound token is `Ok(None)`.
    async fn get(&self, token: &str) -> Result<Option<String>, ApplicationError>;

    async fn has(&self, token: &str) -> Result<bool, ApplicationError>;

    /// Removes every binding. Administrative only.
    async fn clear(&self) -> Result<(), ApplicationError>;

    async fn close(&self);
}
