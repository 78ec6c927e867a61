//! Cropper Storage Library
//!
//! This crate provides the artifact store abstraction and its local
//! filesystem implementation.
//!
//! # Naming
//!
//! Artifacts live in a flat namespace under a single root directory. Names
//! are generated by the store (`{uuid}_{kind}.png`) and are the only way to
//! address an artifact. Name generation is centralized in the `names` module.

pub mod local;
pub(crate) mod names;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use names::content_type_for;
pub use traits::{Artifact, ArtifactStore, PurgeFailure, PurgeReport, StorageError, StorageResult};
