//! Error types module
//!
//! All failures of the crop pipeline are unified under [`AppError`]. The
//! [`ErrorMetadata`] trait lets each variant describe how it is presented:
//! HTTP status, machine-readable code, client message and log level.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like bad user input
    Debug,
    /// Warning level - for failures caused by a third party
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "IMAGE_TOO_SMALL")
    fn error_code(&self) -> &'static str;

    /// Whether the user can fix this by resubmitting the form
    fn is_user_correctable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No image file or image URL was provided")]
    MissingInput,

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Image too small: {width}x{height}, must exceed {min_width}x{min_height}")]
    ImageTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage write failure: {0}")]
    StorageWrite(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cleanup pass error: {0}")]
    CleanupPass(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, user_correctable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::MissingInput => (400, "MISSING_INPUT", true, false, LogLevel::Debug),
        AppError::Fetch(_) => (502, "FETCH_ERROR", true, false, LogLevel::Warn),
        AppError::Decode(_) => (400, "DECODE_ERROR", true, false, LogLevel::Debug),
        AppError::ImageTooSmall { .. } => (400, "IMAGE_TOO_SMALL", true, false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", true, false, LogLevel::Debug),
        AppError::StorageWrite(_) => (500, "STORAGE_WRITE_FAILURE", false, true, LogLevel::Error),
        AppError::Storage(_) => (500, "STORAGE_ERROR", false, true, LogLevel::Error),
        AppError::CleanupPass(_) => (500, "CLEANUP_PASS_ERROR", false, true, LogLevel::Warn),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", false, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", false, true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MissingInput => "MissingInput",
            AppError::Fetch(_) => "FetchError",
            AppError::Decode(_) => "DecodeError",
            AppError::ImageTooSmall { .. } => "ImageTooSmall",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::StorageWrite(_) => "StorageWriteFailure",
            AppError::Storage(_) => "Storage",
            AppError::CleanupPass(_) => "CleanupPassError",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_user_correctable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MissingInput => {
                "Please upload an image or provide an image URL.".to_string()
            }
            AppError::Fetch(ref msg) => {
                format!("Could not fetch the image from the given URL: {}", msg)
            }
            AppError::Decode(ref msg) => {
                format!("The data could not be read as an image: {}", msg)
            }
            AppError::ImageTooSmall {
                width,
                height,
                min_width,
                min_height,
            } => format!(
                "Image is too small to crop: {}x{} pixels, both sides must be larger than {}x{}.",
                width, height, min_width, min_height
            ),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::StorageWrite(_) => {
                "The image could not be saved. Please try again later.".to_string()
            }
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::CleanupPass(_) => "Cleanup failed".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
