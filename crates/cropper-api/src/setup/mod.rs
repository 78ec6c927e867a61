//! Application setup and initialization
//!
//! Builds the shared state and router from a validated [`Config`]. Telemetry
//! and the cleanup timer are started by the binary, so tests can build as
//! many apps as they like.

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use cropper_core::{Config, CropMargins};
use cropper_infra::CleanupService;
use cropper_processing::{CropPipeline, ImageSourceResolver};
use cropper_storage::ArtifactStore;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    let store = storage::setup_storage(&config).await?;

    build_app(config, store)
}

/// Assemble state and router around an already opened artifact store.
pub fn build_app(
    config: Config,
    store: Arc<dyn ArtifactStore>,
) -> Result<(Arc<AppState>, axum::Router)> {
    let resolver = ImageSourceResolver::new(config.fetch_timeout(), config.max_image_size_bytes())
        .context("Failed to create image source resolver")?;
    let pipeline = CropPipeline::new(resolver, CropMargins::default());

    let cleanup = Arc::new(CleanupService::new(store.clone(), config.cleanup_interval()));

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        pipeline,
        cleanup,
    });

    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
