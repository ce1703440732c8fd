use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validation::{non_blank, validate_not_blank};

/// A persisted diary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DiaryEntry {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// File name of the current image inside the entry's image directory
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiaryEntry {
    pub fn has_image(&self) -> bool {
        self.image_path.is_some()
    }
}

/// An entry that has not been stored yet; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDiaryEntry {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiaryResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DiaryEntry> for DiaryResponse {
    fn from(entry: DiaryEntry) -> Self {
        DiaryResponse {
            id: entry.id,
            title: entry.title,
            content: entry.content,
            image_path: entry.image_path,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

/// Fields of a new entry
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct CreateDiaryRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 50, message = "Title must be at most 50 characters")
    )]
    pub title: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 500, message = "Content must be at most 500 characters")
    )]
    pub content: String,
}

/// Partial update: absent or blank fields leave the stored value unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateDiaryRequest {
    #[serde(default)]
    #[validate(length(max = 50, message = "Title must be at most 50 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Content must be at most 500 characters"))]
    pub content: Option<String>,
}

impl UpdateDiaryRequest {
    /// Drops blank fields so only real changes remain.
    pub fn without_blank_fields(self) -> Self {
        UpdateDiaryRequest {
            title: non_blank(self.title),
            content: non_blank(self.content),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Substring to look for in entry titles (case-sensitive)
    #[serde(default)]
    #[validate(length(max = 100, message = "Search title must be at most 100 characters"))]
    pub title: Option<String>,
}
