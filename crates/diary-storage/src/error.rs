//! Storage error types

use std::io;

use diary_core::AppError;
use thiserror::Error;

/// Image storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Upload failed: {message}")]
    UploadFailed {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("Download failed: {message}")]
    DownloadFailed {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("Delete failed: {message}")]
    DeleteFailed {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedType(msg) => AppError::UnsupportedMediaType(msg),
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::UploadFailed { message, source }
            | StorageError::DownloadFailed { message, source }
            | StorageError::DeleteFailed { message, source } => {
                AppError::IoFailure { message, source }
            }
            StorageError::IoError(source) => AppError::IoFailure {
                message: "Image storage operation failed".to_string(),
                source,
            },
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        }
    }
}
