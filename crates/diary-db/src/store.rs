use async_trait::async_trait;
use diary_core::{
    models::{DiaryEntry, NewDiaryEntry},
    AppError,
};

/// Persistence for diary entries
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries, ordered by id
    async fn find_all(&self) -> Result<Vec<DiaryEntry>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<DiaryEntry>, AppError>;

    /// Entries whose title contains `fragment` (case-sensitive), ordered by id
    async fn find_by_title_containing(&self, fragment: &str) -> Result<Vec<DiaryEntry>, AppError>;

    /// Store a new entry; the store assigns id, `created_at` and `updated_at`.
    async fn insert(&self, entry: NewDiaryEntry) -> Result<DiaryEntry, AppError>;

    /// Rewrite title, content and image of an existing entry and refresh `updated_at`.
    ///
    /// Fails with `NotFound` when the row no longer exists.
    async fn update(&self, entry: &DiaryEntry) -> Result<DiaryEntry, AppError>;

    /// Remove an entry. Removing an unknown id succeeds.
    async fn delete_by_id(&self, id: i64) -> Result<(), AppError>;
}
