//! Diary entry lifecycle: create, partial update, delete, and image attachment.
//!
//! The service owns every mutation of an entry. Rows go through `EntryStore`, image
//! files through `ImageStore`; the two are not transactional with each other.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use diary_core::{
    models::{CreateDiaryRequest, DiaryEntry, NewDiaryEntry, UpdateDiaryRequest},
    validation::is_blank,
    AppError,
};
use diary_db::EntryStore;
use diary_storage::{ImageStore, StorageError, UploadedImage};
use validator::Validate;

/// Image bytes ready to be served
#[derive(Debug, Clone)]
pub struct DiaryImage {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub file_name: String,
}

#[derive(Clone)]
pub struct DiaryService {
    store: Arc<dyn EntryStore>,
    images: Arc<ImageStore>,
}

fn diary_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Diary {} not found", id))
}

fn image_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Image for diary {} not found", id))
}

impl DiaryService {
    pub fn new(store: Arc<dyn EntryStore>, images: Arc<ImageStore>) -> Self {
        Self { store, images }
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<DiaryEntry>, AppError> {
        self.store.find_all().await
    }

    /// Entries whose title contains `title`; a missing or blank query lists everything.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, title: Option<&str>) -> Result<Vec<DiaryEntry>, AppError> {
        match title.filter(|t| !is_blank(t)) {
            Some(fragment) => self.store.find_by_title_containing(fragment).await,
            None => self.list().await,
        }
    }

    #[tracing::instrument(skip(self), fields(diary.id = id))]
    pub async fn get_by_id(&self, id: i64) -> Result<DiaryEntry, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| diary_not_found(id))
    }

    /// Store a new entry and, when a non-empty image is supplied, attach it.
    ///
    /// The image's extension is checked before the row is written. If writing the file
    /// fails afterwards, the new row is removed again.
    #[tracing::instrument(skip(self, request, image))]
    pub async fn create(
        &self,
        request: CreateDiaryRequest,
        image: Option<UploadedImage>,
    ) -> Result<DiaryEntry, AppError> {
        request.validate()?;

        let image = image.filter(|img| !img.is_empty());
        if let Some(img) = &image {
            ImageStore::check_upload(img)?;
        }

        let entry = self
            .store
            .insert(NewDiaryEntry {
                title: request.title,
                content: request.content,
            })
            .await?;

        tracing::info!(diary.id = entry.id, has_image = image.is_some(), "Diary entry created");

        let Some(img) = image else {
            return Ok(entry);
        };

        let id = entry.id;
        match self.attach_image(entry, &img).await {
            Ok(entry) => Ok(entry),
            Err(e) => {
                tracing::warn!(error = %e, diary.id = id, "Image attach failed, removing new entry");
                if let Err(cleanup) = self.store.delete_by_id(id).await {
                    tracing::error!(error = %cleanup, diary.id = id, "Failed to remove entry after image attach failure");
                }
                if let Err(cleanup) = self.images.delete_entry_images(id).await {
                    tracing::error!(error = %cleanup, diary.id = id, "Failed to clean image directory");
                }
                Err(e)
            }
        }
    }

    async fn attach_image(
        &self,
        mut entry: DiaryEntry,
        image: &UploadedImage,
    ) -> Result<DiaryEntry, AppError> {
        let file_name = self
            .images
            .store(entry.id, image, entry.image_path.as_deref())
            .await?;
        entry.image_path = Some(file_name);
        self.store.update(&entry).await
    }

    /// Partial update: blank or absent fields keep their stored value, and the image is
    /// replaced only when a non-empty one is supplied.
    #[tracing::instrument(skip(self, request, image), fields(diary.id = id))]
    pub async fn update(
        &self,
        id: i64,
        request: UpdateDiaryRequest,
        image: Option<UploadedImage>,
    ) -> Result<DiaryEntry, AppError> {
        let mut entry = self.get_by_id(id).await?;

        let changes = request.without_blank_fields();
        changes.validate()?;

        let image = image.filter(|img| !img.is_empty());
        if let Some(img) = &image {
            ImageStore::check_upload(img)?;
        }

        if changes.is_noop() && image.is_none() {
            tracing::debug!("Update carries no changes");
        }

        if let Some(title) = changes.title {
            entry.title = title;
        }
        if let Some(content) = changes.content {
            entry.content = content;
        }

        match image {
            Some(img) => self.attach_image(entry, &img).await,
            None => self.store.update(&entry).await,
        }
    }

    /// Remove the row, then the entry's image directory.
    ///
    /// A directory cleanup failure is reported as `IoFailure` after the row is already gone.
    #[tracing::instrument(skip(self), fields(diary.id = id))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.store.delete_by_id(id).await?;

        if let Err(e) = self.images.delete_entry_images(id).await {
            tracing::error!(
                error = %e,
                path = %self.images.entry_dir(id).display(),
                "Diary row deleted but its image directory could not be removed"
            );
            return Err(e.into());
        }

        Ok(())
    }

    /// Path of the entry's current image.
    #[tracing::instrument(skip(self), fields(diary.id = id))]
    pub async fn get_image_path(&self, id: i64) -> Result<PathBuf, AppError> {
        let entry = self.get_by_id(id).await?;
        let file_name = entry
            .image_path
            .filter(|name| !is_blank(name))
            .ok_or_else(|| image_not_found(id))?;

        Ok(self.images.image_path(id, &file_name)?)
    }

    #[tracing::instrument(skip(self), fields(diary.id = id))]
    pub async fn get_image(&self, id: i64) -> Result<DiaryImage, AppError> {
        let path = self.get_image_path(id).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| image_not_found(id))?;

        let content_type = ImageStore::resolve_content_type(&file_name)?;
        let bytes = self.images.read_bytes(&path).await.map_err(|e| match e {
            StorageError::NotFound(_) => image_not_found(id),
            other => other.into(),
        })?;

        Ok(DiaryImage {
            bytes,
            content_type,
            file_name,
        })
    }
}
