//! Image directory setup

use std::sync::Arc;

use anyhow::{Context, Result};
use diary_core::Config;
use diary_storage::ImageStore;

/// Create the image root if needed and open an `ImageStore` on it
pub async fn setup_image_store(config: &Config) -> Result<Arc<ImageStore>> {
    let store = ImageStore::new(config.image_dir())
        .await
        .context("Failed to initialize image storage")?;

    tracing::info!(
        image_dir = %store.base_dir().display(),
        max_image_mb = config.max_image_size_bytes() / 1024 / 1024,
        "Image storage ready"
    );

    Ok(Arc::new(store))
}
