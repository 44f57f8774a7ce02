//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all PaperLens metrics
pub const METRICS_PREFIX: &str = "paperlens";

/// Buckets for model latency (multimodal calls on whole PDFs are slow)
pub const EXTRACTION_BUCKETS: &[f64] = &[
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    20.00,  // 20s
    30.00,  // 30s
    60.00,  // 1m
    120.0,  // 2m
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Extraction metrics
    describe_counter!(
        format!("{}_extractions_total", METRICS_PREFIX),
        Unit::Count,
        "Total extraction attempts by outcome"
    );

    describe_histogram!(
        format!("{}_extraction_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Model round-trip latency in seconds"
    );

    // Persistence metrics
    describe_counter!(
        format!("{}_papers_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total papers saved"
    );

    describe_counter!(
        format!("{}_papers_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Total papers deleted"
    );

    // Webhook metrics
    describe_counter!(
        format!("{}_webhook_files_total", METRICS_PREFIX),
        Unit::Count,
        "Files processed from Drive notifications by outcome"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record extraction metrics
///
/// `outcome` is one of `success`, `upstream_error`, `parse_error`.
pub fn record_extraction(duration_secs: f64, model: &str, outcome: &str) {
    counter!(
        format!("{}_extractions_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_extraction_duration_seconds", METRICS_PREFIX),
        "model" => model.to_string()
    )
    .record(duration_secs);
}

/// Helper to record persistence metrics
pub fn record_paper_created() {
    counter!(format!("{}_papers_created_total", METRICS_PREFIX)).increment(1);
}

pub fn record_paper_deleted(existed: bool) {
    counter!(
        format!("{}_papers_deleted_total", METRICS_PREFIX),
        "existed" => existed.to_string()
    )
    .increment(1);
}

/// Helper to record a settled webhook batch
pub fn record_webhook_batch(total: usize, succeeded: usize) {
    counter!(
        format!("{}_webhook_files_total", METRICS_PREFIX),
        "outcome" => "success"
    )
    .increment(succeeded as u64);

    counter!(
        format!("{}_webhook_files_total", METRICS_PREFIX),
        "outcome" => "failure"
    )
    .increment(total.saturating_sub(succeeded) as u64);
}
