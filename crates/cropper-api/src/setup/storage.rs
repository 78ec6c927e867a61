//! Storage setup and initialization

use anyhow::{Context, Result};
use cropper_core::Config;
use cropper_storage::{ArtifactStore, LocalStorage};
use std::sync::Arc;

/// Open the artifact directory, creating it if needed.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ArtifactStore>> {
    tracing::info!(
        storage_dir = %config.storage_dir().display(),
        "Initializing artifact storage..."
    );

    let storage = LocalStorage::new(config.storage_dir())
        .await
        .context("Failed to initialize artifact storage")?;

    storage
        .health_check()
        .await
        .context("Artifact storage is not usable")?;

    tracing::info!("Artifact storage initialized successfully");
    Ok(Arc::new(storage))
}
