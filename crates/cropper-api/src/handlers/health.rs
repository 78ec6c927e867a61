//! Health check handler.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use cropper_infra::CleanupSchedule;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct HealthCheckResponse {
    status: &'static str,
    storage: String,
    cleanup: CleanupSchedule,
}

/// Storage reachability plus the purge schedule.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = match tokio::time::timeout(CHECK_TIMEOUT, state.store.health_check()).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Storage health check failed");
            format!("unhealthy: {}", e)
        }
        Err(_) => "timeout".to_string(),
    };

    let healthy = storage == "healthy";
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        storage,
        cleanup: state.cleanup.schedule(),
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
