//! Download lifecycle.

use tracing::{debug, error};

use docstore_core::error::{AppError, ErrorKind};
use docstore_core::result::AppResult;
use docstore_core::traits::storage::ByteStream;
use docstore_core::types::DocumentId;
use docstore_entity::document::Document;

use super::service::DocumentService;

/// A document ready to be streamed to a client.
pub struct DocumentDownload {
    /// The record being served.
    pub document: Document,
    /// MIME type to serve the content with.
    pub content_type: &'static str,
    /// Blob content.
    pub stream: ByteStream,
}

impl std::fmt::Debug for DocumentDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentDownload")
            .field("document", &self.document)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl DocumentService {
    /// Open a document's content for streaming.
    ///
    /// An unknown id is `NotFound`. A known id whose blob cannot be found
    /// is `InconsistentState`.
    pub async fn download(&self, id: DocumentId) -> AppResult<DocumentDownload> {
        let document = self.find(id).await?;

        let stream = self.blobs.get(&document.stored_name).await.map_err(|e| {
            match e.kind {
                // A record naming an unservable blob is drift, whatever the cause.
                ErrorKind::NotFound | ErrorKind::Validation => {
                    error!(
                        document_id = %id,
                        stored_name = %document.stored_name,
                        error = %e,
                        "Document record has no usable blob"
                    );
                    AppError::with_source(
                        ErrorKind::InconsistentState,
                        format!("Document {id} exists but its content is missing"),
                        e,
                    )
                }
                _ => e,
            }
        })?;

        debug!(document_id = %id, size_bytes = document.size_bytes, "Serving document");
        Ok(DocumentDownload {
            content_type: content_type_for(&document.original_filename),
            document,
            stream,
        })
    }
}

/// MIME type to serve a stored file as, judged by its display name.
pub fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.') {
        Some((_, ext)) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
