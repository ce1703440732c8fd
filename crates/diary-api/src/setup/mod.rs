//! Application setup and initialization
//!
//! Everything `main` needs to go from a `Config` to a serving router.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use anyhow::{Context, Result};
use diary_core::Config;
use diary_db::DiaryRepository;

use crate::services::DiaryService;
use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;
    let images = storage::setup_image_store(&config).await?;

    let diary = DiaryService::new(Arc::new(DiaryRepository::new(pool.clone())), images);

    let state = Arc::new(AppState {
        diary,
        config: config.clone(),
        db_pool: Some(pool),
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
