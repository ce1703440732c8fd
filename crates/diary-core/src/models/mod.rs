//! Data models for the application

mod diary;

pub use diary::*;
