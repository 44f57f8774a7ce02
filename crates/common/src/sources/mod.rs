//! Remote document sources
//!
//! Extraction can be fed either uploaded bytes or an identifier of a file held
//! by a storage provider. A [`DocumentSource`] resolves such an identifier to
//! the file's bytes.

mod drive;

pub use drive::GoogleDriveSource;

use crate::config::DriveConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Source name accepted on the extract endpoint and used by the Drive webhook
pub const GOOGLE_DRIVE: &str = "google-drive";

/// Trait for fetching remote documents
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Download the file identified by `file_id`
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>>;

    /// Get the source name
    fn name(&self) -> &str;
}

/// Mock source for testing
///
/// Serves fixed bytes per id; unknown ids fail as upstream errors.
pub struct MockDocumentSource {
    name: String,
    files: HashMap<String, Vec<u8>>,
}

impl Default for MockDocumentSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDocumentSource {
    pub fn new() -> Self {
        Self::named("mock-source")
    }

    /// Mock answering to a specific source name, e.g. [`GOOGLE_DRIVE`]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: HashMap::new(),
        }
    }

    pub fn with_file(mut self, file_id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(file_id.into(), bytes.into());
        self
    }
}

#[async_trait]
impl DocumentSource for MockDocumentSource {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| AppError::upstream(&self.name, format!("File not found: {}", file_id)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Create the Drive source if an access token is configured
pub fn create_drive_source(config: &DriveConfig) -> Result<Option<Arc<dyn DocumentSource>>> {
    match &config.access_token {
        Some(token) if !token.is_empty() => Ok(Some(Arc::new(GoogleDriveSource::new(
            token.clone(),
            config.api_base.clone(),
        )?))),
        _ => {
            tracing::warn!("No Drive access token configured, remote file extraction disabled");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_source_serves_known_files() {
        let source = MockDocumentSource::new().with_file("abc", b"%PDF".to_vec());
        assert_eq!(source.fetch("abc").await.unwrap(), b"%PDF");
        assert!(matches!(
            source.fetch("missing").await,
            Err(AppError::Upstream { .. })
        ));
    }

    #[test]
    fn test_named_mock() {
        assert_eq!(MockDocumentSource::new().name(), "mock-source");
        assert_eq!(MockDocumentSource::named(GOOGLE_DRIVE).name(), GOOGLE_DRIVE);
    }

    #[test]
    fn test_drive_source_requires_token() {
        assert!(create_drive_source(&DriveConfig::default()).unwrap().is_none());

        let config = DriveConfig {
            access_token: Some("ya29.token".to_string()),
            api_base: None,
        };
        let source = create_drive_source(&config).unwrap().unwrap();
        assert_eq!(source.name(), GOOGLE_DRIVE);
    }
}
