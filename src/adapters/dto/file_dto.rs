use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadFileResponse {
    pub token: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

impl UploadFileResponse {
    pub fn new(host: &str, token: String) -> Self {
        Self {
            download_url: format!("http://{}/download?token={}", host, token),
            token,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct DownloadQuery {
    pub token: Option<String>,
}
