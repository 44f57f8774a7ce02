//! Process-local paper store

use crate::db::models::Paper;
use crate::db::PaperStore;
use crate::errors::Result;
use crate::record::ExtractedRecord;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory [`PaperStore`], used for development and tests
#[derive(Default)]
pub struct MemoryPaperStore {
    papers: RwLock<Vec<Paper>>,
}

impl MemoryPaperStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored papers
    pub async fn len(&self) -> usize {
        self.papers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.papers.read().await.is_empty()
    }
}

#[async_trait]
impl PaperStore for MemoryPaperStore {
    async fn create(&self, record: ExtractedRecord) -> Result<Paper> {
        let paper = Paper::from_record(Uuid::now_v7(), chrono::Utc::now().into(), record);
        self.papers.write().await.push(paper.clone());
        Ok(paper)
    }

    async fn list(&self) -> Result<Vec<Paper>> {
        let mut papers = self.papers.read().await.clone();
        papers.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(papers)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let mut papers = self.papers.write().await;
        let before = papers.len();
        papers.retain(|p| p.id != id);
        Ok(papers.len() < before)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> ExtractedRecord {
        ExtractedRecord {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let store = MemoryPaperStore::new();
        let paper = store.create(record("A")).await.unwrap();

        assert!(!paper.id.is_nil());
        assert_eq!(paper.created_at, paper.updated_at);
        assert_eq!(store.list().await.unwrap()[0].id, paper.id);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryPaperStore::new();
        let a = store.create(record("a")).await.unwrap();
        let b = store.create(record("b")).await.unwrap();
        let c = store.create(record("c")).await.unwrap();

        let titles: Vec<String> = store.list().await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
        assert!(c.created_at >= b.created_at && b.created_at >= a.created_at);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryPaperStore::new();
        let paper = store.create(record("gone soon")).await.unwrap();

        assert!(store.delete_by_id(paper.id).await.unwrap());
        assert!(!store.delete_by_id(paper.id).await.unwrap());
        assert!(store.is_empty().await);
    }
}
