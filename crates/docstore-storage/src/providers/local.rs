//! Local filesystem blob store.
//!
//! Every blob is a flat file directly under the root directory. Writes go
//! to `<name>.partial` first and are renamed into place only after the
//! content is flushed and synced, so readers never observe a half-written
//! blob.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

use docstore_core::error::{AppError, ErrorKind};
use docstore_core::result::AppResult;
use docstore_core::traits::storage::{BlobEntry, BlobStore, ByteStream, StoredBlob};

use crate::naming;

/// Local filesystem blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Directory holding every blob.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a new store rooted at the given path, creating it if needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a validated name to its path within the root.
    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Copy `content` into `file`, enforcing `max_bytes`.
    async fn copy_stream(
        file: &mut fs::File,
        mut content: ByteStream,
        max_bytes: Option<u64>,
    ) -> AppResult<u64> {
        let mut total_bytes = 0u64;
        while let Some(chunk) = content.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    "Upload stream terminated abnormally",
                    e,
                )
            })?;
            total_bytes += chunk.len() as u64;
            if let Some(limit) = max_bytes {
                if total_bytes > limit {
                    return Err(AppError::validation(format!(
                        "File exceeds maximum upload size of {limit} bytes"
                    )));
                }
            }
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::StorageWrite, "Failed to write chunk", e)
            })?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::StorageWrite, "Failed to flush blob", e))?;
        file.sync_all()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::StorageWrite, "Failed to sync blob", e))?;
        Ok(total_bytes)
    }
}

/// Removes an unfinished blob unless disarmed.
///
/// Error paths call [`PartialBlobGuard::discard`]; the `Drop` impl covers
/// the write future being cancelled mid-stream.
struct PartialBlobGuard {
    path: Option<PathBuf>,
}

impl PartialBlobGuard {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn disarm(&mut self) {
        self.path = None;
    }

    async fn discard(mut self) {
        if let Some(path) = self.path.take() {
            match fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "Removed partial blob"),
                Err(e) if e.kind() == IoErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial blob"),
            }
        }
    }
}

impl Drop for PartialBlobGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed abandoned partial blob"),
                Err(e) if e.kind() == IoErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove abandoned partial blob")
                }
            }
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {}
            _ => return Ok(false),
        }

        let probe = self.root.join(format!(".health-{}", Uuid::new_v4().simple()));
        if fs::write(&probe, b"ok").await.is_err() {
            return Ok(false);
        }
        if let Err(e) = fs::remove_file(&probe).await {
            warn!(path = %probe.display(), error = %e, "Failed to remove health probe file");
        }
        Ok(true)
    }

    async fn put(
        &self,
        content: ByteStream,
        original_filename: &str,
        max_bytes: Option<u64>,
    ) -> AppResult<StoredBlob> {
        let stored_name = naming::generate_stored_name(original_filename);
        let final_path = self.resolve(&stored_name);
        let partial_path = self.resolve(&naming::partial_name(&stored_name));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&partial_path)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StorageWrite,
                    format!("Failed to create blob: {stored_name}"),
                    e,
                )
            })?;
        let mut guard = PartialBlobGuard::new(partial_path.clone());

        let size_bytes = match Self::copy_stream(&mut file, content, max_bytes).await {
            Ok(n) => n,
            Err(e) => {
                drop(file);
                guard.discard().await;
                return Err(e);
            }
        };
        drop(file);

        let collision = fs::try_exists(&final_path).await.unwrap_or(true);
        if collision {
            guard.discard().await;
            return Err(AppError::storage_write(format!(
                "Refusing to overwrite existing blob: {stored_name}"
            )));
        }

        if let Err(e) = fs::rename(&partial_path, &final_path).await {
            guard.discard().await;
            return Err(AppError::with_source(
                ErrorKind::StorageWrite,
                format!("Failed to finalize blob: {stored_name}"),
                e,
            ));
        }
        guard.disarm();

        debug!(stored_name = %stored_name, size_bytes, "Wrote blob from stream");
        Ok(StoredBlob {
            stored_name,
            size_bytes,
        })
    }

    async fn get(&self, stored_name: &str) -> AppResult<ByteStream> {
        naming::validate_stored_name(stored_name)?;
        let file = fs::File::open(self.resolve(stored_name)).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {stored_name}"))
            } else {
                AppError::with_source(
                    ErrorKind::StorageRead,
                    format!("Failed to open blob: {stored_name}"),
                    e,
                )
            }
        })?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream))
    }

    async fn size(&self, stored_name: &str) -> AppResult<u64> {
        naming::validate_stored_name(stored_name)?;
        let meta = fs::metadata(self.resolve(stored_name)).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {stored_name}"))
            } else {
                AppError::with_source(
                    ErrorKind::StorageRead,
                    format!("Failed to stat blob: {stored_name}"),
                    e,
                )
            }
        })?;
        Ok(meta.len())
    }

    async fn delete(&self, stored_name: &str) -> AppResult<()> {
        naming::validate_blob_file_name(stored_name)?;
        match fs::remove_file(self.resolve(stored_name)).await {
            Ok(()) => {
                debug!(stored_name, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                debug!(stored_name, "Blob already absent");
                Ok(())
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::StorageDelete,
                format!("Failed to delete blob: {stored_name}"),
                e,
            )),
        }
    }

    async fn list(&self) -> AppResult<Vec<BlobEntry>> {
        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageRead,
                format!("Failed to list storage root: {}", self.root.display()),
                e,
            )
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::StorageRead, "Failed to read directory entry", e)
        })? {
            let name = entry.file_name().to_string_lossy().to_string();
            // Anything we could not have written is not ours to report.
            if naming::validate_blob_file_name(&name).is_err() {
                continue;
            }

            let meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::StorageRead, "Failed to get entry metadata", e)
            })?;
            if !meta.is_file() {
                continue;
            }

            entries.push(BlobEntry {
                partial: naming::is_partial(&name),
                size_bytes: meta.len(),
                modified_at: meta.modified().ok().map(chrono::DateTime::<chrono::Utc>::from),
                name,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
