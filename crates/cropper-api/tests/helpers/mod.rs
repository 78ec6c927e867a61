//! Test helpers: build the app over a temporary storage directory.
//!
//! Run from workspace root: `cargo test -p cropper-api`.

#![allow(dead_code)]

pub mod fixtures;
pub mod upstream;

use axum_test::TestServer;
use cropper_api::setup;
use cropper_api::state::AppState;
use cropper_core::Config;
use cropper_storage::{ArtifactStore, LocalStorage};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

/// Test application: server, shared state and the storage directory it owns.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of published artifacts (staging area excluded).
    pub fn artifact_count(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path())
            .expect("Failed to read storage directory")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .count()
    }
}

fn test_config(temp_dir: &TempDir) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("STORAGE_DIR", temp_dir.path().display().to_string()),
        ("FETCH_TIMEOUT_SECS", "5".to_string()),
        ("MAX_IMAGE_SIZE_MB", "2".to_string()),
        ("CLEANUP_INTERVAL_SECS", "3600".to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config")
}

/// Setup test app with an isolated storage directory.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp_dir);

    let (state, router) = setup::initialize_app(config)
        .await
        .expect("Failed to initialize app");

    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        temp_dir,
    }
}

/// Setup test app whose store is built by `make_store` over the temporary
/// storage directory.
pub async fn setup_test_app_with_store<F, S>(make_store: F) -> TestApp
where
    F: FnOnce(LocalStorage) -> S,
    S: ArtifactStore + 'static,
{
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp_dir);

    let local = LocalStorage::new(temp_dir.path())
        .await
        .expect("Failed to open storage");
    let store: Arc<dyn ArtifactStore> = Arc::new(make_store(local));

    let (state, router) = setup::build_app(config, store).expect("Failed to build app");

    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        temp_dir,
    }
}

/// Artifact names linked from a result page, in page order.
pub fn download_links(html: &str) -> Vec<String> {
    html.split("href=\"/download/")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}
