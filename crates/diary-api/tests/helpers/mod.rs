//! Test helpers: build AppState and router for integration tests.
//!
//! The router is the production one; entries live in `MemoryEntryStore` and images in a
//! temporary directory, so no database is needed.

pub mod fixtures;

use std::path::PathBuf;
use std::sync::Arc;

use axum_test::TestServer;
use diary_api::services::DiaryService;
use diary_api::setup::routes;
use diary_api::state::AppState;
use diary_core::{BaseConfig, Config, DiaryConfig};
use diary_db::MemoryEntryStore;
use diary_storage::ImageStore;
use tempfile::TempDir;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Test application: server plus the temp dir backing the image store.
pub struct TestApp {
    pub server: TestServer,
    pub image_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Directory holding the images of one entry
    pub fn entry_dir(&self, id: i64) -> PathBuf {
        self.image_dir.join(id.to_string())
    }
}

fn test_config(image_dir: PathBuf, max_image_size_bytes: usize) -> Config {
    Config::new(DiaryConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 5,
            environment: "test".to_string(),
        },
        database_url: "postgres://unused/diary".to_string(),
        image_dir,
        max_image_size_bytes,
    })
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_limit(DEFAULT_MAX_IMAGE_BYTES).await
}

pub async fn setup_test_app_with_limit(max_image_size_bytes: usize) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let image_dir = temp_dir.path().join("images");
    let config = test_config(image_dir.clone(), max_image_size_bytes);

    let images = ImageStore::new(&image_dir)
        .await
        .expect("Failed to create image store");
    let diary = DiaryService::new(Arc::new(MemoryEntryStore::new()), Arc::new(images));

    let state = Arc::new(AppState {
        diary,
        config: config.clone(),
        db_pool: None,
    });

    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        image_dir,
        _temp_dir: temp_dir,
    }
}
