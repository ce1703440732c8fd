//! Diary Core Library
//!
//! This crate provides the domain model, error types, configuration, and validation
//! shared by the store, storage, and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, DiaryConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
