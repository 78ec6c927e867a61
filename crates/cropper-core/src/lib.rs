//! Cropper Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by every Cropper component.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, CropperConfig, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ArtifactKind, ArtifactName, CropMargins, InvalidArtifactName};
