use std::io::Cursor;

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use crate::{
    adapters::{
        dto::file_dto::{DownloadQuery, UploadFileResponse},
        state::AppState,
    },
    application::error::ApplicationError,
    domain::models::file::FileReader,
};

pub struct FileController;

fn multipart_error(e: MultipartError) -> ApplicationError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApplicationError::PayloadTooLarge
    } else {
        warn!("Invalid multipart data: {}", e);
        ApplicationError::BadRequest("Unable to read uploaded file".to_string())
    }
}

/// `attachment; filename="..."` with the name as an HTTP quoted-string.
fn content_disposition(file_name: &str) -> String {
    let escaped = file_name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("attachment; filename=\"{}\"", escaped)
}

impl FileController {
    /// POST /upload
    /// Multipart body with a `file` field carrying the original filename.
    pub async fn upload_file(
        State(app_state): State<AppState>,
        headers: HeaderMap,
        mut multipart: Multipart,
    ) -> Result<(StatusCode, Json<UploadFileResponse>), ApplicationError> {
        let mut upload: Option<(String, axum::body::Bytes)> = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some("file") {
                continue;
            }

            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    warn!("Upload 'file' field has no filename");
                    ApplicationError::BadRequest("Missing filename".to_string())
                })?;
            let bytes = field.bytes().await.map_err(multipart_error)?;

            upload = Some((filename, bytes));
            break;
        }

        let (filename, bytes) = upload.ok_or_else(|| {
            warn!("Missing required 'file' field in upload");
            ApplicationError::BadRequest("Unable to read uploaded file".to_string())
        })?;

        if bytes.len() > app_state.max_upload_bytes {
            return Err(ApplicationError::PayloadTooLarge);
        }

        let size = bytes.len();
        let mut content: FileReader = Box::new(Cursor::new(bytes));
        let token = app_state
            .file_manager
            .save_file(&filename, &mut content)
            .await?;

        info!(filename = %filename, size, "Upload complete");

        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");

        Ok((
            StatusCode::CREATED,
            Json(UploadFileResponse::new(host, token)),
        ))
    }

    /// GET /download?token=...
    pub async fn download_file(
        State(app_state): State<AppState>,
        Query(query): Query<DownloadQuery>,
    ) -> Result<Response, ApplicationError> {
        let token = query
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApplicationError::BadRequest("Missing token query param".to_string()))?;

        let mut file = app_state.file_manager.load_file(&token).await?;

        let mut file_bytes = Vec::with_capacity(file.size as usize);
        file.reader
            .read_to_end(&mut file_bytes)
            .await
            .map_err(|e| ApplicationError::InternalError(format!("Unable to send file: {}", e)))?;

        let headers = [
            (header::CONTENT_TYPE, file.mime_type),
            (header::CONTENT_LENGTH, file_bytes.len().to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&file.file_name),
            ),
        ];

        Ok((StatusCode::OK, headers, Body::from(file_bytes)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_disposition_escapes_quoted_string() {
        assert_eq!(
            content_disposition("manual.txt"),
            "attachment; filename=\"manual.txt\""
        );
        assert_eq!(
            content_disposition("a\"b.txt"),
            "attachment; filename=\"a\\\"b.txt\""
        );
        assert_eq!(
            content_disposition("a\\b\".txt"),
            "attachment; filename=\"a\\\\b\\\".txt\""
        );
    }
}
