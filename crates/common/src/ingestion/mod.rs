//! Ingestion boundary for remote files
//!
//! Resolves a storage-provider file id to bytes and runs the extraction
//! pipeline on them. Used by the extract endpoint's JSON form and by the
//! Drive notification trigger.

mod trigger;

pub use trigger::{BatchOutcome, NotificationTrigger};

use crate::errors::{AppError, Result};
use crate::extraction::ExtractionPipeline;
use crate::record::ExtractedRecord;
use crate::sources::DocumentSource;
use std::sync::Arc;
use tracing::instrument;

/// Extraction of files held by a remote document source
#[derive(Clone)]
pub struct RemoteIngestion {
    pipeline: ExtractionPipeline,
    source: Option<Arc<dyn DocumentSource>>,
}

impl RemoteIngestion {
    pub fn new(pipeline: ExtractionPipeline, source: Option<Arc<dyn DocumentSource>>) -> Self {
        Self { pipeline, source }
    }

    /// Whether a remote source is configured
    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Fetch `file_id` from the named source and extract its metadata
    #[instrument(skip(self))]
    pub async fn extract_file(&self, source_name: &str, file_id: &str) -> Result<ExtractedRecord> {
        let source = self.source.as_ref().ok_or_else(|| AppError::Configuration {
            message: "No remote document source configured".to_string(),
        })?;

        if source.name() != source_name {
            return Err(AppError::Validation {
                message: format!("Unsupported document source: {}", source_name),
                field: Some("source".to_string()),
            });
        }

        let bytes = source.fetch(file_id).await?;
        self.pipeline.extract(&bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockModel;
    use crate::sources::MockDocumentSource;

    fn ingestion(source: Option<Arc<dyn DocumentSource>>) -> RemoteIngestion {
        let model = Arc::new(MockModel::new(r#"{"title":"Remote paper"}"#));
        RemoteIngestion::new(ExtractionPipeline::new(model), source)
    }

    #[tokio::test]
    async fn test_extracts_remote_file() {
        let source: Arc<dyn DocumentSource> = Arc::new(MockDocumentSource::new().with_file("f1", b"%PDF-1.4".to_vec()));
        let record = ingestion(Some(source)).extract_file("mock-source", "f1").await.unwrap();
        assert_eq!(record.title, "Remote paper");
    }

    #[tokio::test]
    async fn test_unknown_source_name_is_rejected() {
        let source: Arc<dyn DocumentSource> = Arc::new(MockDocumentSource::new());
        let err = ingestion(Some(source)).extract_file("dropbox", "f1").await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_missing_source_is_configuration_error() {
        let remote = ingestion(None);
        assert!(!remote.is_enabled());
        let err = remote.extract_file("google-drive", "f1").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_empty_remote_file_is_input_error() {
        let source: Arc<dyn DocumentSource> = Arc::new(MockDocumentSource::new().with_file("empty", Vec::new()));
        let err = ingestion(Some(source)).extract_file("mock-source", "empty").await.unwrap_err();
        assert!(matches!(err, AppError::MissingField { .. }));
    }
}
