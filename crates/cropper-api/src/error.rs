//! HTTP error response conversion
//!
//! JSON routes return `Result<impl IntoResponse, HttpAppError>`; any error that
//! converts into `AppError` renders consistently (status, body, logging).
//! Whether details are exposed follows the loaded [`Config`]. Page routes
//! render form messages instead, see `handlers::index`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cropper_core::{AppError, Config, ErrorMetadata, LogLevel};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from cropper-core)
#[derive(Debug)]
pub struct HttpAppError {
    error: AppError,
    show_details: bool,
}

impl HttpAppError {
    /// Details are included unless the config says production or the error
    /// is sensitive.
    pub fn new(error: impl Into<AppError>, config: &Config) -> Self {
        let error = error.into();
        let show_details = shows_details(&error, config);
        HttpAppError {
            error,
            show_details,
        }
    }
}

pub(crate) fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

pub(crate) fn shows_details(error: &AppError, config: &Config) -> bool {
    !config.is_production() && !error.is_sensitive()
}

pub(crate) fn status_of(error: &AppError) -> StatusCode {
    StatusCode::from_u16(error.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.error;
        let status = status_of(app_error);

        log_error(app_error);

        let body = if self.show_details {
            ErrorResponse {
                error: app_error.client_message(),
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
                code: app_error.error_code().to_string(),
            }
        } else {
            ErrorResponse {
                error: app_error.client_message(),
                details: None,
                error_type: None,
                code: app_error.error_code().to_string(),
            }
        };

        (status, Json(body)).into_response()
    }
}
