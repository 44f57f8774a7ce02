//! Database layer for PaperLens
//!
//! Provides:
//! - SeaORM entity models
//! - The [`PaperStore`] persistence gateway (create / list / delete)
//! - Repository and in-memory implementations
//! - Connection pool management

mod memory;
pub mod models;
mod repository;

pub use memory::MemoryPaperStore;
pub use repository::Repository;

use crate::config::{AppConfig, DatabaseConfig, StorageBackend};
use crate::errors::{AppError, Result};
use crate::record::ExtractedRecord;
use async_trait::async_trait;
use models::Paper;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Persistence gateway for saved papers
///
/// There is deliberately no update operation: records are edited before
/// saving, never after.
#[async_trait]
pub trait PaperStore: Send + Sync {
    /// Persist a record, assigning its id and creation timestamp
    async fn create(&self, record: ExtractedRecord) -> Result<Paper>;

    /// All saved papers, newest first
    async fn list(&self) -> Result<Vec<Paper>>;

    /// Remove a paper; `Ok(false)` when no such id exists
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;

    /// Check the store is reachable
    async fn ping(&self) -> Result<()>;

    /// Short backend name for logs and readiness output
    fn backend_name(&self) -> &'static str;
}

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let connection = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e),
            })?;

        info!("Database connection established");

        Ok(Self { connection })
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;

        self.connection
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }
}

/// Create the configured paper store
pub async fn create_store(config: &AppConfig) -> Result<Arc<dyn PaperStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory paper store, saved papers are lost on restart");
            Ok(Arc::new(MemoryPaperStore::new()))
        }
        StorageBackend::Postgres => {
            let repo = Repository::new(DbPool::new(&config.database).await?);
            if config.database.auto_create_schema {
                repo.ensure_schema().await?;
            }
            Ok(Arc::new(repo))
        }
    }
}
