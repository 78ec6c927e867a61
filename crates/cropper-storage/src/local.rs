use crate::names::{content_type_for, generate_name};
use crate::traits::{Artifact, ArtifactStore, PurgeFailure, PurgeReport, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use cropper_core::{ArtifactKind, ArtifactName};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::AsyncReadExt;

/// Private directory under the root holding not-yet-published files.
const STAGING_DIR: &str = ".staging";

/// Attempts at drawing a fresh name when publishing hits an existing file.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Local filesystem artifact store
///
/// Every artifact is a regular file directly under `base_path`. Writes go to
/// a staging file first and are renamed into place without clobbering, so a
/// reader only ever sees complete files. Deletion is a plain unlink: readers
/// holding the file open keep reading the full content.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    staging_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// Creates `base_path` if absent and discards staging files left behind
    /// by an earlier process.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        let staging_path = base_path.join(STAGING_DIR);

        fs::create_dir_all(&staging_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let storage = LocalStorage {
            base_path,
            staging_path,
        };
        storage.discard_stale_staging_files().await;

        Ok(storage)
    }

    async fn discard_stale_staging_files(&self) {
        let Ok(mut entries) = fs::read_dir(&self.staging_path).await else {
            return;
        };

        let mut discarded = 0usize;
        while let Ok(Some(entry)) = entries.next_entry().await {
            if fs::remove_file(entry.path()).await.is_ok() {
                discarded += 1;
            }
        }

        if discarded > 0 {
            tracing::info!(
                staging_path = %self.staging_path.display(),
                discarded,
                "Discarded stale staging files"
            );
        }
    }

    fn parse_name(raw: &str) -> StorageResult<ArtifactName> {
        ArtifactName::parse(raw).map_err(|e| StorageError::InvalidKey(e.0))
    }

    fn path_for(&self, name: &ArtifactName) -> PathBuf {
        self.base_path.join(name.as_str())
    }

    /// Write `data` to a private staging file and flush it to disk.
    ///
    /// The staging file is removed when dropped unless it gets published.
    async fn stage(&self, data: Bytes) -> StorageResult<NamedTempFile> {
        let staging_path = self.staging_path.clone();

        tokio::task::spawn_blocking(move || {
            let mut file = tempfile::Builder::new()
                .prefix("put-")
                .suffix(".part")
                .tempfile_in(&staging_path)
                .map_err(|e| {
                    StorageError::UploadFailed(format!(
                        "Failed to create staging file in {}: {}",
                        staging_path.display(),
                        e
                    ))
                })?;

            file.write_all(&data).map_err(|e| {
                StorageError::UploadFailed(format!("Failed to write staging file: {}", e))
            })?;

            file.as_file().sync_all().map_err(|e| {
                StorageError::UploadFailed(format!("Failed to sync staging file: {}", e))
            })?;

            Ok(file)
        })
        .await
        .map_err(|e| StorageError::UploadFailed(format!("Staging task failed: {}", e)))?
    }
}

/// Move one staged file to a freshly generated name, never replacing an
/// existing artifact.
fn publish_one(
    base_path: &Path,
    mut file: NamedTempFile,
    kind: ArtifactKind,
) -> StorageResult<(ArtifactName, PathBuf)> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let name = generate_name(kind).map_err(|e| StorageError::InvalidKey(e.0))?;
        let path = base_path.join(name.as_str());

        match file.persist_noclobber(&path) {
            Ok(_) => return Ok((name, path)),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                tracing::warn!(name = %name, "Generated artifact name already taken, retrying");
                file = e.file;
            }
            Err(e) => {
                return Err(StorageError::UploadFailed(format!(
                    "Failed to publish {}: {}",
                    path.display(),
                    e.error
                )));
            }
        }
    }

    Err(StorageError::UploadFailed(
        "Could not allocate a unique artifact name".to_string(),
    ))
}

/// Publish staged files in order; on failure, unpublish what this batch
/// already published. Unpublished staged files are removed on drop.
fn publish_all(
    base_path: &Path,
    staged: Vec<(NamedTempFile, ArtifactKind)>,
) -> StorageResult<Vec<ArtifactName>> {
    let mut published: Vec<(ArtifactName, PathBuf)> = Vec::with_capacity(staged.len());

    for (file, kind) in staged {
        match publish_one(base_path, file, kind) {
            Ok(entry) => published.push(entry),
            Err(e) => {
                for (name, path) in &published {
                    if let Err(remove_err) = std::fs::remove_file(path) {
                        tracing::error!(
                            error = %remove_err,
                            name = %name,
                            "Failed to roll back partially published batch"
                        );
                    }
                }
                return Err(e);
            }
        }
    }

    // Persist the new directory entries; failure here does not unpublish.
    if let Err(e) = std::fs::File::open(base_path).and_then(|dir| dir.sync_all()) {
        tracing::debug!(error = %e, "Failed to sync storage directory");
    }

    Ok(published.into_iter().map(|(name, _)| name).collect())
}

#[async_trait]
impl ArtifactStore for LocalStorage {
    async fn put_batch(&self, items: Vec<(Bytes, ArtifactKind)>) -> StorageResult<Vec<ArtifactName>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let start = std::time::Instant::now();
        let size_bytes: usize = items.iter().map(|(data, _)| data.len()).sum();

        let mut staged = Vec::with_capacity(items.len());
        for (data, kind) in items {
            staged.push((self.stage(data).await?, kind));
        }

        // Publishing runs to completion on the blocking pool even if the
        // caller stops waiting, so a batch is never left half-published.
        let base_path = self.base_path.clone();
        let names = tokio::task::spawn_blocking(move || publish_all(&base_path, staged))
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Publish task failed: {}", e)))??;

        tracing::info!(
            names = ?names.iter().map(ArtifactName::as_str).collect::<Vec<_>>(),
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(names)
    }

    async fn get(&self, name: &str) -> StorageResult<Artifact> {
        let name = Self::parse_name(name)?;
        let path = self.path_for(&name);
        let start = std::time::Instant::now();

        // Open first, then read through the handle: an unlink that lands
        // after the open cannot truncate what we read.
        let mut file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let metadata = file.metadata().await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to stat file {}: {}", path.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let mut data = Vec::with_capacity(metadata.len() as usize);
        file.read_to_end(&mut data).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let created_at = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        tracing::debug!(
            name = %name,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage get successful"
        );

        Ok(Artifact {
            kind: name.kind(),
            content_type: content_type_for(&name),
            created_at,
            data: Bytes::from(data),
            name,
        })
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let name = Self::parse_name(name)?;
        match fs::metadata(self.path_for(&name)).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    #[tracing::instrument(skip(self), fields(base_path = %self.base_path.display()))]
    async fn purge_all(&self) -> StorageResult<PurgeReport> {
        let start = std::time::Instant::now();
        let mut entries = fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::DeleteFailed(format!(
                "Failed to list {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut report = PurgeReport::default();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    report.failures.push(PurgeFailure {
                        name: self.base_path.display().to_string(),
                        error: StorageError::IoError(e),
                    });
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();

            // Directories (the staging area included) are not artifacts.
            match entry.file_type().await {
                Ok(file_type) if file_type.is_dir() => continue,
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    report.failures.push(PurgeFailure {
                        error: StorageError::NotFound(name.clone()),
                        name,
                    });
                    continue;
                }
                Err(e) => {
                    report.failures.push(PurgeFailure {
                        name,
                        error: StorageError::IoError(e),
                    });
                    continue;
                }
            }

            match fs::remove_file(entry.path()).await {
                Ok(()) => {
                    report.deleted += 1;
                    tracing::debug!(name = %name, "Deleted artifact");
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    report.failures.push(PurgeFailure {
                        error: StorageError::NotFound(name.clone()),
                        name,
                    });
                }
                Err(e) => {
                    report.failures.push(PurgeFailure {
                        error: StorageError::DeleteFailed(format!(
                            "Failed to delete {}: {}",
                            name, e
                        )),
                        name,
                    });
                }
            }
        }

        tracing::info!(
            deleted = report.deleted,
            failed = report.failed(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage purge finished"
        );

        Ok(report)
    }

    async fn health_check(&self) -> StorageResult<()> {
        let metadata = fs::metadata(&self.base_path).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(StorageError::ConfigError(format!(
                "{} is not a directory",
                self.base_path.display()
            )))
        }
    }
}
