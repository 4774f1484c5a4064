//! Upload lifecycle: validate, store the blob, record metadata.

use bytes::Bytes;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use docstore_core::error::{AppError, ErrorKind};
use docstore_core::result::AppResult;
use docstore_core::traits::storage::{ByteStream, StoredBlob};
use docstore_entity::document::{Document, NewDocument};

use super::service::DocumentService;

/// One incoming upload.
pub struct UploadRequest {
    /// Display name supplied by the client.
    pub original_filename: String,
    /// Declared MIME type, parameters allowed (`application/pdf; q=1`).
    pub content_type: Option<String>,
    /// Size announced up front, when the transport knows it.
    pub declared_size: Option<u64>,
    /// File content.
    pub body: ByteStream,
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("original_filename", &self.original_filename)
            .field("content_type", &self.content_type)
            .field("declared_size", &self.declared_size)
            .finish_non_exhaustive()
    }
}

impl DocumentService {
    /// Store a new document and return its record.
    ///
    /// Nothing touches storage until validation passes, including the size
    /// of bodies whose length is not declared up front: those are read into
    /// memory, at most `max_upload_size_bytes` of them, before the blob is
    /// written. A blob failure leaves the registry untouched; a registry
    /// failure deletes the blob again before reporting.
    pub async fn upload(&self, request: UploadRequest) -> AppResult<Document> {
        let UploadRequest {
            original_filename,
            content_type,
            declared_size,
            body,
        } = request;

        debug!(
            original_filename = %original_filename,
            content_type = ?content_type,
            declared_size = ?declared_size,
            "Validating upload"
        );
        self.validate_upload(&original_filename, content_type.as_deref(), declared_size)?;
        let limit = self.config.max_upload_size_bytes;
        let chunks = read_within_limit(body, limit).await?;
        let body: ByteStream =
            Box::pin(stream::iter(chunks.into_iter().map(Ok::<Bytes, std::io::Error>)));

        debug!(original_filename = %original_filename, "Storing blob");
        let blob = self
            .blobs
            .put(body, &original_filename, Some(limit))
            .await
            .map_err(|e| match e.kind {
                ErrorKind::Validation | ErrorKind::StorageWrite => e,
                _ => AppError::with_source(ErrorKind::StorageWrite, "Failed to store upload", e),
            })?;

        debug!(stored_name = %blob.stored_name, size_bytes = blob.size_bytes, "Recording metadata");
        match self.record(&original_filename, &blob).await {
            Ok(document) => {
                info!(
                    document_id = %document.id,
                    stored_name = %document.stored_name,
                    size_bytes = document.size_bytes,
                    "Document uploaded"
                );
                Ok(document)
            }
            Err(e) => Err(self.compensate_upload(&blob, e).await),
        }
    }

    /// Check an upload's metadata against the configured limits.
    pub fn validate_upload(
        &self,
        original_filename: &str,
        content_type: Option<&str>,
        declared_size: Option<u64>,
    ) -> AppResult<()> {
        if original_filename.trim().is_empty() {
            return Err(AppError::validation("A filename is required"));
        }

        let declared = content_type
            .map(essence)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::validation("A content type is required"))?;
        let allowed = self
            .config
            .allowed_content_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&declared));
        if !allowed {
            return Err(AppError::validation(format!(
                "Content type '{declared}' is not allowed; expected one of: {}",
                self.config.allowed_content_types.join(", ")
            )));
        }

        if !self.config.allowed_extensions.is_empty() {
            let extension = original_filename
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .unwrap_or_default();
            if !self
                .config
                .allowed_extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&extension))
            {
                return Err(AppError::validation(format!(
                    "File extension '{extension}' is not allowed"
                )));
            }
        }

        if let Some(size) = declared_size {
            if size > self.config.max_upload_size_bytes {
                return Err(AppError::validation(format!(
                    "File exceeds maximum upload size of {} bytes",
                    self.config.max_upload_size_bytes
                )));
            }
        }

        Ok(())
    }

    async fn record(&self, original_filename: &str, blob: &StoredBlob) -> AppResult<Document> {
        let size_bytes = i64::try_from(blob.size_bytes).map_err(|_| {
            AppError::persistence(format!("Blob size {} is out of range", blob.size_bytes))
        })?;
        self.registry
            .create(&NewDocument {
                original_filename: original_filename.to_string(),
                stored_name: blob.stored_name.clone(),
                size_bytes,
                created_at: Utc::now(),
            })
            .await
    }

    /// Remove the blob of an upload whose record could not be written.
    async fn compensate_upload(&self, blob: &StoredBlob, cause: AppError) -> AppError {
        warn!(
            stored_name = %blob.stored_name,
            error = %cause,
            "Recording metadata failed, removing stored blob"
        );

        match self.blobs.delete(&blob.stored_name).await {
            Ok(()) => AppError::with_source(
                ErrorKind::Persistence,
                "Failed to record document; upload was rolled back",
                cause,
            ),
            Err(cleanup) => {
                error!(
                    stored_name = %blob.stored_name,
                    record_error = %cause,
                    cleanup_error = %cleanup,
                    "Rollback failed, blob is orphaned"
                );
                AppError::with_source(
                    ErrorKind::Persistence,
                    format!(
                        "Failed to record document and failed to remove blob '{}': {cleanup}",
                        blob.stored_name
                    ),
                    cause,
                )
            }
        }
    }
}

/// Drain an upload body, failing as soon as it grows past `limit` bytes.
async fn read_within_limit(mut body: ByteStream, limit: u64) -> AppResult<Vec<Bytes>> {
    let mut chunks = Vec::new();
    let mut total_bytes = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| {
            AppError::with_source(
                ErrorKind::StorageWrite,
                "Upload stream terminated abnormally",
                e,
            )
        })?;
        total_bytes += chunk.len() as u64;
        if total_bytes > limit {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {limit} bytes"
            )));
        }
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// MIME type without parameters, lowercased.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
