//! Generative model abstraction
//!
//! The extraction pipeline depends on exactly one capability: send a document
//! plus an instruction to a multimodal model and get its raw text back.
//! Providers:
//! - Gemini (`generateContent` with inline PDF data)
//! - Mock (canned response, for tests and offline development)

mod gemini;

pub use gemini::GeminiClient;

use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A binary document encoded for transport inside a JSON request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub mime_type: String,
    /// Standard base64 of the document bytes
    pub data: String,
}

/// Trait for metadata extraction models
#[async_trait]
pub trait MetadataModel: Send + Sync {
    /// Submit the document and instruction as one request, return the raw reply text
    async fn extract_metadata(&self, document: &EncodedDocument, prompt: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Mock model for testing
///
/// Returns a fixed reply (or a fixed upstream failure) and counts calls, so
/// tests can assert that no request was made.
pub struct MockModel {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// A model whose every call fails as an upstream error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Number of requests made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompt of the most recent request
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl MetadataModel for MockModel {
    async fn extract_metadata(&self, _document: &EncodedDocument, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }

        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(AppError::upstream("mock-model", message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Reply used by the mock provider when none is configured
const DEFAULT_MOCK_REPLY: &str = r#"{"doi":"","title":"Untitled","author":"","publicationTitle":"","publicationDate":"","url":"","keywords":"","abstract":"","publisher":"","fieldOfStudy":"","isDataFusionPaper":false,"dataFusionClassificationReason":""}"#;

/// Create a model client based on configuration
pub fn create_model(config: &LlmConfig) -> Result<Arc<dyn MetadataModel>> {
    match config.provider.as_str() {
        "gemini" => {
            let key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
                message: "Gemini API key required (llm.api_key or GEMINI_API_KEY)".to_string(),
            })?;
            Ok(Arc::new(GeminiClient::new(
                key,
                Some(config.model.clone()),
                config.api_base.clone(),
            )?))
        }
        "mock" => {
            tracing::warn!("Using mock extraction model, replies are canned");
            let reply = config
                .mock_response
                .clone()
                .unwrap_or_else(|| DEFAULT_MOCK_REPLY.to_string());
            Ok(Arc::new(MockModel::new(reply)))
        }
        other => Err(AppError::Configuration {
            message: format!("Unknown model provider: {}", other),
        }),
    }
}
