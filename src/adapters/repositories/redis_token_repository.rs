use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::application::{
    error::ApplicationError, repositories::token_repository::TokenRepository,
};

const KEY_PREFIX: &str = "file_token:";

pub struct RedisTokenRepository {
    client: redis::aio::ConnectionManager,
}

impl RedisTokenRepository {
    pub fn new(client: redis::aio::ConnectionManager) -> Self {
        Self { client }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, ApplicationError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| ApplicationError::DatabaseError(format!("Invalid Redis URL: {}", e)))?;
        let manager = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| ApplicationError::DatabaseError(format!("Redis connection failed: {}", e)))?;

        info!("Redis token registry ready");
        Ok(Self::new(manager))
    }

    fn get_redis_key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, token)
    }
}

fn redis_error(action: &str, e: redis::RedisError) -> ApplicationError {
    ApplicationError::DatabaseError(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl TokenRepository for RedisTokenRepository {
    async fn record(&self, token: &str, file_name: &str) -> Result<(), ApplicationError> {
        let key = Self::get_redis_key(token);
        let mut conn = self.client.clone();

        // SETNX is the uniqueness guard: it refuses to touch an existing binding.
        let inserted: bool = conn
            .set_nx(&key, file_name)
            .await
            .map_err(|e| redis_error("store token", e))?;

        if !inserted {
            debug!("Token key already present: '{}'", key);
            return Err(ApplicationError::TokenConflict);
        }

        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>, ApplicationError> {
        let mut conn = self.client.clone();
        conn.get(Self::get_redis_key(token))
            .await
            .map_err(|e| redis_error("read token", e))
    }

    async fn has(&self, token: &str) -> Result<bool, ApplicationError> {
        let mut conn = self.client.clone();
        conn.exists(Self::get_redis_key(token))
            .await
            .map_err(|e| redis_error("check token", e))
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        let mut conn = self.client.clone();

        let keys: Vec<String> = {
            let mut iter = conn
                .scan_match::<_, String>(format!("{}*", KEY_PREFIX))
                .await
                .map_err(|e| redis_error("scan tokens", e))?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if !keys.is_empty() {
            conn.del::<_, ()>(&keys)
                .await
                .map_err(|e| redis_error("delete tokens", e))?;
        }

        info!(removed = keys.len(), "Redis token registry cleared");
        Ok(())
    }

    async fn close(&self) {}
}
