//! Notification trigger: fan-out extraction over changed remote files
//!
//! One task per file id, all awaited to completion. A failing file is logged
//! and counted; it never aborts or cancels its siblings.

use super::RemoteIngestion;
use crate::metrics;
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, instrument};

/// Settled result of one notification batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
}

impl BatchOutcome {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

/// Runs remote extraction for every file named in a change notification
#[derive(Clone)]
pub struct NotificationTrigger {
    ingestion: RemoteIngestion,
    source_name: String,
}

impl NotificationTrigger {
    pub fn new(ingestion: RemoteIngestion, source_name: impl Into<String>) -> Self {
        Self {
            ingestion,
            source_name: source_name.into(),
        }
    }

    /// Extract every file concurrently and wait for all of them to settle
    #[instrument(skip(self, file_ids), fields(files = file_ids.len(), source = %self.source_name))]
    pub async fn process(&self, file_ids: &[String]) -> BatchOutcome {
        let tasks = file_ids.iter().map(|file_id| async move {
            match self.ingestion.extract_file(&self.source_name, file_id).await {
                Ok(record) => {
                    info!(file_id = %file_id, title = %record.title, "Successfully extracted file");
                    true
                }
                Err(e) => {
                    error!(file_id = %file_id, error = %e, "Failed to extract file");
                    false
                }
            }
        });

        let results = join_all(tasks).await;
        let outcome = BatchOutcome {
            total: results.len(),
            succeeded: results.into_iter().filter(|ok| *ok).count(),
        };

        metrics::record_webhook_batch(outcome.total, outcome.succeeded);
        info!(
            total = outcome.total,
            succeeded = outcome.succeeded,
            failed = outcome.failed(),
            "Notification batch settled"
        );

        outcome
    }
}
