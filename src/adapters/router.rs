use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::{
    controllers::{file_controller::FileController, health_controller::HealthController},
    middleware::log_request,
    state::AppState,
};

/// Headroom for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(app_state: AppState) -> Router {
    let body_limit = app_state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(HealthController::welcome))
        .route("/health", get(HealthController::health_check))
        .route("/upload", post(FileController::upload_file))
        .route("/download", get(FileController::download_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(app_state)
}
