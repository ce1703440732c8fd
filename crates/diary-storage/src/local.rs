use crate::error::{StorageError, StorageResult};
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Image extensions accepted for upload (compared lower-cased)
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// An image received from a client
#[derive(Debug, Clone, Default)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedImage {
    /// True when no bytes were received; treated as "no file supplied".
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Content type sent by the client. Only logged; the extension decides how the image is served.
    pub fn declared_content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or("unknown")
    }
}

/// Local filesystem image storage, one directory per entry id
#[derive(Debug, Clone)]
pub struct ImageStore {
    base_dir: PathBuf,
}

impl ImageStore {
    /// Create a new ImageStore, creating `base_dir` when it does not exist yet.
    pub async fn new(base_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_dir = base_dir.into();

        fs::create_dir_all(&base_dir).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create image directory {}: {}",
                base_dir.display(),
                e
            ))
        })?;

        Ok(ImageStore { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Lower-cased extension of the last path component, if any.
    pub fn extension_of(filename: &str) -> Option<String> {
        let name = filename.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(filename);
        name.rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    pub fn is_extension_supported(filename: &str) -> bool {
        if filename.trim().is_empty() {
            return false;
        }
        Self::extension_of(filename)
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// Random unique name keeping the upload's extension, lower-cased.
    pub fn generate_file_name(original: &str) -> StorageResult<String> {
        if !Self::is_extension_supported(original) {
            return Err(Self::unsupported(original));
        }
        let ext = Self::extension_of(original).unwrap_or_default();
        Ok(format!("{}.{}", Uuid::new_v4(), ext))
    }

    /// Fails with `UnsupportedType` unless the upload's name carries an accepted extension.
    pub fn check_upload(image: &UploadedImage) -> StorageResult<()> {
        match image.file_name.as_deref() {
            Some(name) if Self::is_extension_supported(name) => Ok(()),
            other => Err(Self::unsupported(other.unwrap_or_default())),
        }
    }

    fn unsupported(filename: &str) -> StorageError {
        StorageError::UnsupportedType(format!(
            "'{}' is not a supported image; allowed extensions are {}",
            filename,
            SUPPORTED_EXTENSIONS.join(", ")
        ))
    }

    pub fn entry_dir(&self, entry_id: i64) -> PathBuf {
        self.base_dir.join(entry_id.to_string())
    }

    /// Path of a stored image, rejecting names that would leave the entry directory.
    pub fn image_path(&self, entry_id: i64, filename: &str) -> StorageResult<PathBuf> {
        if filename.trim().is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(StorageError::InvalidKey(format!(
                "Image name '{}' contains invalid characters",
                filename
            )));
        }
        Ok(self.entry_dir(entry_id).join(filename))
    }

    /// Write `image` for `entry_id` and return its generated file name.
    ///
    /// The previous image, if named, is removed only after the new one is on disk.
    pub async fn store(
        &self,
        entry_id: i64,
        image: &UploadedImage,
        previous: Option<&str>,
    ) -> StorageResult<String> {
        Self::check_upload(image)?;
        let file_name = Self::generate_file_name(image.file_name.as_deref().unwrap_or_default())?;
        let path = self.image_path(entry_id, &file_name)?;

        fs::create_dir_all(self.entry_dir(entry_id)).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::UploadFailed {
                message: format!("Failed to create file {}", path.display()),
                source: e,
            })?;

        file.write_all(&image.data)
            .await
            .map_err(|e| StorageError::UploadFailed {
                message: format!("Failed to write file {}", path.display()),
                source: e,
            })?;

        file.sync_all()
            .await
            .map_err(|e| StorageError::UploadFailed {
                message: format!("Failed to sync file {}", path.display()),
                source: e,
            })?;

        tracing::info!(
            path = %path.display(),
            diary.id = entry_id,
            size_bytes = image.len(),
            content_type = image.declared_content_type(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image store write successful"
        );

        if let Some(old) = previous.filter(|old| !old.trim().is_empty() && *old != file_name) {
            self.delete_image(entry_id, old).await?;
        }

        Ok(file_name)
    }

    /// Remove one image file; an absent file counts as removed.
    pub async fn delete_image(&self, entry_id: i64, filename: &str) -> StorageResult<()> {
        let path = self.image_path(entry_id, filename)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), diary.id = entry_id, "Image deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed {
                message: format!("Failed to delete file {}", path.display()),
                source: e,
            }),
        }
    }

    /// Recursively remove the entry's image directory; a missing directory counts as removed.
    pub async fn delete_entry_images(&self, entry_id: i64) -> StorageResult<()> {
        let dir = self.entry_dir(entry_id);
        let start = std::time::Instant::now();

        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::info!(
                    path = %dir.display(),
                    diary.id = entry_id,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Image directory delete successful"
                );
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed {
                message: format!("Failed to delete directory {}", dir.display()),
                source: e,
            }),
        }
    }

    pub fn resolve_content_type(filename: &str) -> StorageResult<&'static str> {
        match Self::extension_of(filename).as_deref() {
            Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
            Some("png") => Ok("image/png"),
            Some("gif") => Ok("image/gif"),
            _ => Err(Self::unsupported(filename)),
        }
    }

    /// Read a stored image. The path must lie inside the base directory.
    pub async fn read_bytes(&self, path: &Path) -> StorageResult<Bytes> {
        if !path.starts_with(&self.base_dir)
            || path.components().any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(StorageError::InvalidKey(format!(
                "{} is outside the image directory",
                path.display()
            )));
        }

        match fs::read(path).await {
            Ok(data) => {
                tracing::debug!(path = %path.display(), size_bytes = data.len(), "Image read");
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed {
                message: format!("Failed to read file {}", path.display()),
                source: e,
            }),
        }
    }
}
