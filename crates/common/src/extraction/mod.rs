//! Extraction pipeline: PDF bytes → model prompt → JSON → [`ExtractedRecord`]
//!
//! A single linear transform with one external suspension point (the model
//! call). Failures are all-or-nothing:
//! - empty input → [`AppError::MissingField`], no model call is made
//! - model call fails → [`AppError::Upstream`], not retried
//! - reply is not a JSON object → [`AppError::ModelOutput`] with the raw text

pub mod parser;
pub mod prompt;

use crate::errors::{AppError, Result};
use crate::llm::{EncodedDocument, MetadataModel};
use crate::metrics;
use crate::record::ExtractedRecord;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub use parser::{parse_model_output, strip_code_fences};
pub use prompt::EXTRACTION_PROMPT;

/// Encode raw PDF bytes for transport inside a JSON request
pub fn encode_document(bytes: &[u8]) -> EncodedDocument {
    EncodedDocument {
        mime_type: crate::PDF_MIME_TYPE.to_string(),
        data: STANDARD.encode(bytes),
    }
}

/// Hex SHA-256 of a document, used to correlate log lines
pub fn document_fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Metadata extraction pipeline
#[derive(Clone)]
pub struct ExtractionPipeline {
    model: Arc<dyn MetadataModel>,
}

impl ExtractionPipeline {
    pub fn new(model: Arc<dyn MetadataModel>) -> Self {
        Self { model }
    }

    /// Name of the model behind the pipeline
    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Extract a metadata record from raw PDF bytes
    #[instrument(skip(self, document), fields(bytes = document.len(), model = %self.model.model_name()))]
    pub async fn extract(&self, document: &[u8]) -> Result<ExtractedRecord> {
        if document.is_empty() {
            return Err(AppError::MissingField {
                field: "PDF file".to_string(),
            });
        }

        let fingerprint = document_fingerprint(document);
        let encoded = encode_document(document);
        debug!(
            document_sha256 = %fingerprint,
            encoded_len = encoded.data.len(),
            "Document encoded"
        );

        let start = Instant::now();
        let raw = match self.model.extract_metadata(&encoded, EXTRACTION_PROMPT).await {
            Ok(raw) => raw,
            Err(e) => {
                metrics::record_extraction(start.elapsed().as_secs_f64(), self.model_name(), "upstream_error");
                warn!(document_sha256 = %fingerprint, error = %e, "Model call failed");
                return Err(self.as_upstream(e));
            }
        };

        let map = match parse_model_output(&raw) {
            Ok(map) => map,
            Err(e) => {
                metrics::record_extraction(start.elapsed().as_secs_f64(), self.model_name(), "parse_error");
                warn!(
                    document_sha256 = %fingerprint,
                    raw_len = raw.len(),
                    error = %e,
                    "Model reply was not a JSON object"
                );
                return Err(e);
            }
        };

        let record = ExtractedRecord::from_json_map(&map);
        metrics::record_extraction(start.elapsed().as_secs_f64(), self.model_name(), "success");

        info!(
            document_sha256 = %fingerprint,
            title = %record.title,
            populated_fields = record.populated_fields(),
            is_data_fusion_paper = record.is_data_fusion_paper,
            duration_ms = start.elapsed().as_millis() as u64,
            "Metadata extracted"
        );

        Ok(record)
    }

    /// Any failure of the model call is an upstream failure
    fn as_upstream(&self, err: AppError) -> AppError {
        match err {
            AppError::Upstream { .. } | AppError::HttpClient(_) => err,
            other => AppError::upstream(self.model_name(), other.to_string()),
        }
    }
}
