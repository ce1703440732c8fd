//! Application state shared by every handler.

use diary_core::Config;
use sqlx::PgPool;

use crate::services::DiaryService;

#[derive(Clone)]
pub struct AppState {
    pub diary: DiaryService,
    pub config: Config,
    /// Present when entries live in PostgreSQL; readiness checks ping it.
    pub db_pool: Option<PgPool>,
}
