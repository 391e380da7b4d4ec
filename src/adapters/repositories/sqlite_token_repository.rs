use async_trait::async_trait;
use sqlx::{query, query_as, raw_sql, sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::{
    adapters::repositories::map_insert_error,
    application::{error::ApplicationError, repositories::token_repository::TokenRepository},
};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS files (
        id INTEGER NOT NULL PRIMARY KEY,
        token VARCHAR(24) NOT NULL,
        filename VARCHAR(255) NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_files_token ON files (token);
"#;

pub struct SqliteTokenRepository {
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    /// Opens the database at `url` (creating the file if needed) and ensures the schema.
    pub async fn connect(url: &str) -> Result<Self, ApplicationError> {
        let options = url
            .parse::<sqlx::sqlite::SqliteConnectOptions>()
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?
            .create_if_missing(true);

        // Every connection to `sqlite::memory:` is a separate database, so keep exactly one alive.
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Self::new(pool).await
    }

    pub async fn new(pool: SqlitePool) -> Result<Self, ApplicationError> {
        raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        info!("SQLite token registry ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    async fn record(&self, token: &str, file_name: &str) -> Result<(), ApplicationError> {
        query("INSERT INTO files (token, filename) VALUES (?, ?)")
            .bind(token)
            .bind(file_name)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;

        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>, ApplicationError> {
        let row: Option<(String,)> = query_as("SELECT filename FROM files WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(file_name,)| file_name))
    }

    async fn has(&self, token: &str) -> Result<bool, ApplicationError> {
        let (count,): (i64,) = query_as("SELECT COUNT(1) FROM files WHERE token = ?")
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
        info!("SQLite token registry closed");
    }
}
