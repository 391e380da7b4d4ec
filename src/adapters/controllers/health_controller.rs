use axum::Json;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub struct HealthController;

impl HealthController {
    /// GET /
    pub async fn welcome() -> &'static str {
        "Welcome to the FileServer. Use upload/ or download/ endpoints"
    }

    /// GET /health
    pub async fn health_check() -> Json<HealthResponse> {
        debug!("Health check requested");

        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
