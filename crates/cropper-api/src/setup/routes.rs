//! Router and middleware stack

use crate::handlers::{download, health, index};
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use cropper_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries, headers and the URL field.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let body_limit = config
        .max_image_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    tracing::info!(
        body_limit_bytes = body_limit,
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        "HTTP limits configured"
    );

    Router::new()
        .route("/", get(index::show_form).post(index::submit))
        .route("/download/{name}", get(download::download_artifact))
        .route("/artifacts/{name}", get(download::view_artifact))
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
}
