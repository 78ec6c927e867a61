//! Artifact download and preview.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use cropper_core::AppError;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Disposition {
    Attachment,
    Inline,
}

/// Serve an artifact as a file download.
#[tracing::instrument(skip(state), fields(operation = "download_artifact"))]
pub async fn download_artifact(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, HttpAppError> {
    artifact_response(&state, &name, Disposition::Attachment).await
}

/// Serve an artifact for display in the page.
pub async fn view_artifact(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, HttpAppError> {
    artifact_response(&state, &name, Disposition::Inline).await
}

async fn artifact_response(
    state: &AppState,
    name: &str,
    disposition: Disposition,
) -> Result<Response, HttpAppError> {
    let artifact = state
        .store
        .get(name)
        .await
        .map_err(|e| HttpAppError::new(e, &state.config))?;

    tracing::debug!(
        name = %artifact.name,
        size_bytes = artifact.data.len(),
        "Serving artifact"
    );

    let disposition = match disposition {
        Disposition::Attachment => format!("attachment; filename=\"{}\"", artifact.name),
        Disposition::Inline => format!("inline; filename=\"{}\"", artifact.name),
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(artifact.data))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::new(AppError::Internal(e.to_string()), &state.config)
        })
}
