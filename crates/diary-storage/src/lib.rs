//! Diary Storage Library
//!
//! This crate keeps entry images on the local filesystem.
//!
//! # Layout
//!
//! Every entry owns one directory named after its id, holding at most one current image:
//!
//! - `{base_dir}/{entry_id}/{uuid}.{ext}`
//!
//! Stored file names never contain a path separator or `..`.

pub mod error;
pub mod local;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use local::{ImageStore, UploadedImage, SUPPORTED_EXTENSIONS};
