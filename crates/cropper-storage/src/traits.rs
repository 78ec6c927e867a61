//! Artifact store abstraction
//!
//! This module defines the `ArtifactStore` trait that storage backends implement,
//! together with the values it hands back.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use cropper_core::{AppError, ArtifactKind, ArtifactName};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Invalid artifact name: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => {
                AppError::NotFound("Artifact not found".to_string())
            }
            StorageError::UploadFailed(msg) => AppError::StorageWrite(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// A stored artifact read back from the store.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: ArtifactName,
    /// Kind encoded in the name; `None` for files the store did not generate.
    pub kind: Option<ArtifactKind>,
    pub created_at: DateTime<Utc>,
    pub content_type: &'static str,
    pub data: Bytes,
}

/// A single entry that a purge pass could not remove.
#[derive(Debug)]
pub struct PurgeFailure {
    pub name: String,
    pub error: StorageError,
}

/// Outcome of a purge pass.
#[derive(Debug, Default)]
pub struct PurgeReport {
    pub deleted: usize,
    pub failures: Vec<PurgeFailure>,
}

impl PurgeReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Artifact store abstraction trait
///
/// Writers publish complete artifacts under store-generated names; readers
/// fetch them back by name. A purge removes everything present when it starts
/// and may run concurrently with both.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `data` under a fresh unique name and return it.
    ///
    /// The artifact is durably visible to every other caller once this returns.
    async fn put(&self, data: Bytes, kind: ArtifactKind) -> StorageResult<ArtifactName> {
        self.put_batch(vec![(data, kind)])
            .await?
            .pop()
            .ok_or_else(|| StorageError::UploadFailed("Store returned no artifact name".to_string()))
    }

    /// Persist several artifacts all-or-nothing.
    ///
    /// Names are returned in input order. If any member fails to publish, the
    /// members already published by this call are removed again.
    async fn put_batch(&self, items: Vec<(Bytes, ArtifactKind)>) -> StorageResult<Vec<ArtifactName>>;

    /// Read an artifact by name.
    ///
    /// Returns either the complete artifact or `NotFound`; a concurrent purge
    /// never produces a truncated read.
    async fn get(&self, name: &str) -> StorageResult<Artifact>;

    /// Check if an artifact exists
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Delete every artifact present when the pass starts.
    ///
    /// Per-entry failures are collected in the report instead of aborting the
    /// pass. Purging an empty store reports zero deletions.
    async fn purge_all(&self) -> StorageResult<PurgeReport>;

    /// Verify the backing location is reachable.
    async fn health_check(&self) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropper_core::ErrorMetadata;

    #[test]
    fn test_unknown_and_invalid_names_map_to_404() {
        for err in [
            StorageError::NotFound("a_cropped.png".to_string()),
            StorageError::InvalidKey("../etc/passwd".to_string()),
        ] {
            let app_err = AppError::from(err);
            assert_eq!(app_err.http_status_code(), 404);
        }
    }

    #[test]
    fn test_upload_failure_is_storage_write() {
        let app_err = AppError::from(StorageError::UploadFailed("disk full".to_string()));
        assert!(matches!(app_err, AppError::StorageWrite(_)));
        assert!(app_err.is_sensitive());
    }
}
