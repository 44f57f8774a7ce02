//! PaperLens Common Library
//!
//! Shared code for the PaperLens services including:
//! - Paper metadata extraction pipeline (PDF → LLM → typed record)
//! - Generative model client abstraction
//! - Remote document sources (Google Drive)
//! - Persistence gateway (SeaORM repository and in-memory store)
//! - Notification fan-out for webhook-triggered extraction
//! - CSV export
//! - Error types, configuration, and metrics

pub mod config;
pub mod db;
pub mod errors;
pub mod export;
pub mod extraction;
pub mod ingestion;
pub mod llm;
pub mod metrics;
pub mod record;
pub mod sources;

// Re-export commonly used types
pub use errors::{AppError, Result};
pub use config::AppConfig;
pub use db::{PaperStore, Repository};
pub use extraction::ExtractionPipeline;
pub use llm::MetadataModel;
pub use record::ExtractedRecord;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generative model used for extraction
pub const DEFAULT_EXTRACTION_MODEL: &str = "gemini-2.5-flash";

/// MIME type submitted alongside the encoded document
pub const PDF_MIME_TYPE: &str = "application/pdf";
