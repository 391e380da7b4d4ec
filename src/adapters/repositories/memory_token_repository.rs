use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::application::{
    error::ApplicationError, repositories::token_repository::TokenRepository,
};

/// Token bindings held in process memory; lost on restart.
#[derive(Default)]
pub struct MemoryTokenRepository {
    tokens: Mutex<HashMap<String, String>>,
}

impl MemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, ApplicationError> {
        self.tokens
            .lock()
            .map_err(|_| ApplicationError::InternalError("Token map lock poisoned".to_string()))
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn record(&self, token: &str, file_name: &str) -> Result<(), ApplicationError> {
        let mut tokens = self.lock()?;
        if tokens.contains_key(token) {
            return Err(ApplicationError::TokenConflict);
        }
        tokens.insert(token.to_string(), file_name.to_string());
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>, ApplicationError> {
        Ok(self.lock()?.get(token).cloned())
    }

    async fn has(&self, token: &str) -> Result<bool, ApplicationError> {
        Ok(self.lock()?.contains_key(token))
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        self.lock()?.clear();
        Ok(())
    }

    async fn close(&self) {}
}
