pub mod diary;

pub use diary::{DiaryImage, DiaryService};
