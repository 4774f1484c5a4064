//! Document service construction and read-only queries.

use std::sync::Arc;

use tracing::debug;

use docstore_core::config::StorageConfig;
use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_core::traits::storage::BlobStore;
use docstore_core::types::DocumentId;
use docstore_database::DocumentRegistry;
use docstore_entity::document::{Document, DocumentSummary};

/// Composes a [`BlobStore`] and a [`DocumentRegistry`].
///
/// Upload writes the blob before the record; delete removes the blob before
/// the record. Every use case lives in its own module as an `impl` block.
#[derive(Clone)]
pub struct DocumentService {
    /// Upload validation and pruning settings.
    pub(crate) config: StorageConfig,
    /// Blob content.
    pub(crate) blobs: Arc<dyn BlobStore>,
    /// Document metadata.
    pub(crate) registry: Arc<dyn DocumentRegistry>,
}

/// Reachability of the two backing stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ServiceHealth {
    /// Registry answered a probe query.
    pub registry: bool,
    /// Blob store root is present and writable.
    pub storage: bool,
}

impl ServiceHealth {
    /// Both stores are usable.
    pub fn is_healthy(&self) -> bool {
        self.registry && self.storage
    }
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService")
            .field("provider", &self.blobs.provider_type())
            .finish()
    }
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        config: StorageConfig,
        blobs: Arc<dyn BlobStore>,
        registry: Arc<dyn DocumentRegistry>,
    ) -> Self {
        Self {
            config,
            blobs,
            registry,
        }
    }

    /// Storage settings this service validates against.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// All documents, most recent first.
    pub async fn list(&self) -> AppResult<Vec<DocumentSummary>> {
        let documents = self.registry.list().await?;
        debug!(count = documents.len(), "Listed documents");
        Ok(documents)
    }

    /// Metadata for one document. Absent → `NotFound`.
    pub async fn get(&self, id: DocumentId) -> AppResult<Document> {
        self.find(id).await
    }

    /// Probe the registry and the blob store. Probe errors count as down.
    pub async fn health_check(&self) -> ServiceHealth {
        let registry = self.registry.health_check().await.unwrap_or(false);
        let storage = self.blobs.health_check().await.unwrap_or(false);
        ServiceHealth { registry, storage }
    }

    pub(crate) async fn find(&self, id: DocumentId) -> AppResult<Document> {
        self.registry
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }
}
