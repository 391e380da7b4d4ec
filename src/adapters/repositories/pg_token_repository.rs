use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, query, query_as, raw_sql, PgPool};
use tracing::info;

use crate::{
    adapters::repositories::map_insert_error,
    application::{error::ApplicationError, repositories::token_repository::TokenRepository},
};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS files (
        id BIGSERIAL PRIMARY KEY,
        token VARCHAR(24) NOT NULL,
        filename VARCHAR(255) NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_files_token ON files (token);
"#;

pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    pub async fn connect(database_url: &str) -> Result<Self, ApplicationError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Self::new(pool).await
    }

    pub async fn new(pool: PgPool) -> Result<Self, ApplicationError> {
        raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        info!("PostgreSQL token registry ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn record(&self, token: &str, file_name: &str) -> Result<(), ApplicationError> {
        query("INSERT INTO files (token, filename) VALUES ($1, $2)")
            .bind(token)
            .bind(file_name)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;

        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>, ApplicationError> {
        let row: Option<(String,)> = query_as("SELECT filename FROM files WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(file_name,)| file_name))
    }

    async fn has(&self, token: &str) -> Result<bool, ApplicationError> {
        let (count,): (i64,) = query_as("SELECT COUNT(1) FROM files WHERE token = $1")
            .bind(token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(count > 0)
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        query("DELETE FROM files")
            .execute(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL token registry closed");
    }
}
