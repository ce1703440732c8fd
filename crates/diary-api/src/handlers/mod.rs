pub mod diary;
pub mod health;
