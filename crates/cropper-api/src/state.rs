use cropper_core::Config;
use cropper_infra::CleanupService;
use cropper_processing::CropPipeline;
use cropper_storage::ArtifactStore;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ArtifactStore>,
    pub pipeline: CropPipeline,
    pub cleanup: Arc<CleanupService>,
}
