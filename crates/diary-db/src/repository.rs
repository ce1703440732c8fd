use async_trait::async_trait;
use diary_core::{
    models::{DiaryEntry, NewDiaryEntry},
    AppError,
};
use sqlx::{PgPool, Postgres};

use crate::store::EntryStore;

const SELECT_COLUMNS: &str = "id, title, content, image_path, created_at, updated_at";

/// PostgreSQL-backed entry store over the `diary` table
#[derive(Clone)]
pub struct DiaryRepository {
    pool: PgPool,
}

impl DiaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Escape LIKE wildcards so the fragment matches literally.
pub(crate) fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl EntryStore for DiaryRepository {
    #[tracing::instrument(skip(self), fields(db.table = "diary", db.operation = "select"))]
    async fn find_all(&self) -> Result<Vec<DiaryEntry>, AppError> {
        let entries = sqlx::query_as::<Postgres, DiaryEntry>(&format!(
            "SELECT {} FROM diary ORDER BY id ASC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    #[tracing::instrument(skip(self), fields(db.table = "diary", db.operation = "select", db.record_id = %id))]
    async fn find_by_id(&self, id: i64) -> Result<Option<DiaryEntry>, AppError> {
        let entry = sqlx::query_as::<Postgres, DiaryEntry>(&format!(
            "SELECT {} FROM diary WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    #[tracing::instrument(skip(self), fields(db.table = "diary", db.operation = "select"))]
    async fn find_by_title_containing(&self, fragment: &str) -> Result<Vec<DiaryEntry>, AppError> {
        let pattern = format!("%{}%", escape_like(fragment));

        let entries = sqlx::query_as::<Postgres, DiaryEntry>(&format!(
            r#"SELECT {} FROM diary WHERE title LIKE $1 ESCAPE '\' ORDER BY id ASC"#,
            SELECT_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    #[tracing::instrument(skip(self, entry), fields(db.table = "diary", db.operation = "insert"))]
    async fn insert(&self, entry: NewDiaryEntry) -> Result<DiaryEntry, AppError> {
        let created = sqlx::query_as::<Postgres, DiaryEntry>(&format!(
            r#"
            INSERT INTO diary (title, content, image_path, created_at, updated_at)
            VALUES ($1, $2, NULL, NOW(), NOW())
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(&entry.title)
        .bind(&entry.content)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(diary.id = created.id, "Diary entry inserted");
        Ok(created)
    }

    #[tracing::instrument(skip(self, entry), fields(db.table = "diary", db.operation = "update", db.record_id = %entry.id))]
    async fn update(&self, entry: &DiaryEntry) -> Result<DiaryEntry, AppError> {
        let updated = sqlx::query_as::<Postgres, DiaryEntry>(&format!(
            r#"
            UPDATE diary
            SET title = $2, content = $3, image_path = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(entry.id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(&entry.image_path)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Diary {} not found", entry.id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "diary", db.operation = "delete", db.record_id = %id))]
    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM diary WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(diary.id = id, "Delete matched no diary row");
        }

        Ok(())
    }
}
