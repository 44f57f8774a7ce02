//! Repository pattern for database operations
//!
//! SeaORM-backed implementation of the persistence gateway.

use crate::errors::Result;
use crate::db::{DbPool, PaperStore};
use crate::db::models::*;
use crate::record::ExtractedRecord;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Schema, Set,
};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.connection()
    }

    /// Create the papers table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn();
        let backend = conn.get_database_backend();

        let mut table = Schema::new(backend).create_table_from_entity(PaperEntity);
        table.if_not_exists();

        conn.execute(backend.build(&table)).await?;
        tracing::info!(backend = ?backend, "Papers table ready");

        Ok(())
    }

    // ========================================================================
    // Paper Operations
    // ========================================================================

    /// Create a new paper
    pub async fn create_paper(&self, record: ExtractedRecord) -> Result<Paper> {
        let paper_id = Uuid::now_v7();
        let now = chrono::Utc::now();

        let paper = PaperActiveModel {
            id: Set(paper_id),
            doi: Set(record.doi),
            title: Set(record.title),
            author: Set(record.author),
            publication_title: Set(record.publication_title),
            publication_date: Set(record.publication_date),
            url: Set(record.url),
            keywords: Set(record.keywords),
            abstract_text: Set(record.abstract_text),
            publisher: Set(record.publisher),
            field_of_study: Set(record.field_of_study),
            is_data_fusion_paper: Set(record.is_data_fusion_paper),
            data_fusion_classification_reason: Set(record.data_fusion_classification_reason),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        paper.insert(self.conn()).await.map_err(Into::into)
    }

    /// List all papers, newest first
    pub async fn list_papers(&self) -> Result<Vec<Paper>> {
        PaperEntity::find()
            .order_by_desc(PaperColumn::CreatedAt)
            .order_by_desc(PaperColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Delete paper by ID
    pub async fn delete_paper(&self, id: Uuid) -> Result<bool> {
        let result = PaperEntity::delete_by_id(id)
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl PaperStore for Repository {
    async fn create(&self, record: ExtractedRecord) -> Result<Paper> {
        self.create_paper(record).await
    }

    async fn list(&self) -> Result<Vec<Paper>> {
        self.list_papers().await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        self.delete_paper(id).await
    }

    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    fn backend_name(&self) -> &'static str {
        "sea-orm"
    }
}
