use axum::extract::FromRef;

use crate::application::services::FileManager;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub file_manager: FileManager,
    pub max_upload_bytes: usize,
}
