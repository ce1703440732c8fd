use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use diary_core::{
    models::{DiaryEntry, NewDiaryEntry},
    AppError,
};
use tokio::sync::RwLock;

use crate::store::EntryStore;

#[derive(Default)]
struct Rows {
    last_id: i64,
    entries: BTreeMap<i64, DiaryEntry>,
}

/// In-process entry store with the same ordering and matching rules as `DiaryRepository`
#[derive(Default)]
pub struct MemoryEntryStore {
    rows: RwLock<Rows>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn find_all(&self) -> Result<Vec<DiaryEntry>, AppError> {
        Ok(self.rows.read().await.entries.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<DiaryEntry>, AppError> {
        Ok(self.rows.read().await.entries.get(&id).cloned())
    }

    async fn find_by_title_containing(&self, fragment: &str) -> Result<Vec<DiaryEntry>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .entries
            .values()
            .filter(|e| e.title.contains(fragment))
            .cloned()
            .collect())
    }

    async fn insert(&self, entry: NewDiaryEntry) -> Result<DiaryEntry, AppError> {
        let mut rows = self.rows.write().await;
        rows.last_id += 1;
        let now = Utc::now();
        let created = DiaryEntry {
            id: rows.last_id,
            title: entry.title,
            content: entry.content,
            image_path: None,
            created_at: now,
            updated_at: now,
        };
        rows.entries.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, entry: &DiaryEntry) -> Result<DiaryEntry, AppError> {
        let mut rows = self.rows.write().await;
        let stored = rows
            .entries
            .get_mut(&entry.id)
            .ok_or_else(|| AppError::NotFound(format!("Diary {} not found", entry.id)))?;

        stored.title = entry.title.clone();
        stored.content = entry.content.clone();
        stored.image_path = entry.image_path.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        self.rows.write().await.entries.remove(&id);
        Ok(())
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;

    fn new_entry(title: &str) -> NewDiaryEntry {
        NewDiaryEntry {
            title: title.to_string(),
            content: "body".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryEntryStore::new();
        let a = store.insert(new_entry("a")).await.unwrap();
        let b = store.insert(new_entry("b")).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(store.find_all().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryEntryStore::new();
        let a = store.insert(new_entry("a")).await.unwrap();
        store.delete_by_id(a.id).await.unwrap();
        let b = store.insert(new_entry("b")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_title_search_is_case_sensitive() {
        let store = MemoryEntryStore::new();
        store.insert(new_entry("Morning run")).await.unwrap();
        store.insert(new_entry("morning tea")).await.unwrap();

        let hits = store.find_by_title_containing("Morning").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Morning run");
        assert_eq!(store.find_by_title_containing("orning").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let store = MemoryEntryStore::new();
        let mut entry = store.insert(new_entry("a")).await.unwrap();
        entry.title = "b".to_string();
        entry.image_path = Some("x.png".to_string());

        let updated = store.update(&entry).await.unwrap();
        assert_eq!(updated.title, "b");
        assert_eq!(updated.created_at, entry.created_at);
        assert!(updated.updated_at >= entry.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let store = MemoryEntryStore::new();
        let mut entry = store.insert(new_entry("a")).await.unwrap();
        entry.id = 42;
        assert!(matches!(
            store.update(&entry).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_unknown_succeeds() {
        let store = MemoryEntryStore::new();
        assert!(store.delete_by_id(7).await.is_ok());
        assert!(store.is_empty().await);
    }
}
