//! Google Drive v3 file download (`files/{id}?alt=media`)

use super::{DocumentSource, GOOGLE_DRIVE};
use crate::errors::{AppError, Result};
use async_trait::async_trait;

const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Google Drive document source
pub struct GoogleDriveSource {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleDriveSource {
    pub fn new(access_token: String, base_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            access_token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    fn download_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.base_url.trim_end_matches('/'), file_id)
    }
}

#[async_trait]
impl DocumentSource for GoogleDriveSource {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        if file_id.is_empty() || file_id.contains('/') {
            return Err(AppError::InvalidFormat {
                message: format!("Invalid Drive file id: {:?}", file_id),
            });
        }

        let response = self.client
            .get(self.download_url(file_id))
            .query(&[("alt", "media")])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::upstream(GOOGLE_DRIVE, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                GOOGLE_DRIVE,
                format!("Download of {} failed with {}: {}", file_id, status, body),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| {
            AppError::upstream(GOOGLE_DRIVE, format!("Failed to read body: {}", e))
        })?;

        tracing::debug!(file_id = %file_id, bytes = bytes.len(), "Drive file downloaded");

        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        GOOGLE_DRIVE
    }
}
