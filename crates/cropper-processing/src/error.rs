use cropper_core::AppError;
use thiserror::Error;

/// Failures of the resolve, crop and encode steps.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("No image file or image URL was provided")]
    MissingInput,

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Image too small: {width}x{height}, must exceed {min_width}x{min_height}")]
    ImageTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Processing task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ProcessingError {
    fn from(err: tokio::task::JoinError) -> Self {
        ProcessingError::Task(err.to_string())
    }
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::MissingInput => AppError::MissingInput,
            ProcessingError::Fetch(msg) => AppError::Fetch(msg),
            ProcessingError::Decode(msg) => AppError::Decode(msg),
            ProcessingError::ImageTooSmall {
                width,
                height,
                min_width,
                min_height,
            } => AppError::ImageTooSmall {
                width,
                height,
                min_width,
                min_height,
            },
            ProcessingError::Encode(msg) => AppError::Internal(format!("Encode failed: {}", msg)),
            ProcessingError::Task(msg) => {
                AppError::Internal(format!("Processing task failed: {}", msg))
            }
        }
    }
}
