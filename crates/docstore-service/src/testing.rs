//! Fault-injecting store wrappers and a ready-made service fixture.
//!
//! Running as root bypasses filesystem permissions, so permission errors
//! are simulated by wrapping the real stores instead.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use docstore_core::config::StorageConfig;
use docstore_core::error::{AppError, ErrorKind};
use docstore_core::result::AppResult;
use docstore_core::traits::storage::{BlobEntry, BlobStore, ByteStream, StoredBlob};
use docstore_core::types::DocumentId;
use docstore_database::migration::run_migrations;
use docstore_database::{DatabasePool, DocumentRegistry, DocumentRepository};
use docstore_entity::document::{Document, DocumentSummary, NewDocument};
use docstore_storage::LocalBlobStore;
use docstore_storage::stream::{collect, from_bytes};

use crate::document::{DocumentService, UploadRequest};

fn permission_denied(what: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::PermissionDenied, what.to_string())
}

/// Blob store that can be told to fail writes or deletes.
#[derive(Debug)]
pub struct FaultyBlobStore {
    inner: Arc<dyn BlobStore>,
    fail_put: AtomicBool,
    fail_delete: AtomicBool,
}

impl FaultyBlobStore {
    /// Wrap a working store.
    pub fn new(inner: Arc<dyn BlobStore>) -> Self {
        Self {
            inner,
            fail_put: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }

    /// Make `put` fail with a permission error.
    pub fn fail_puts(&self, fail: bool) {
        self.fail_put.store(fail, Ordering::SeqCst);
    }

    /// Make `delete` fail with a permission error.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for FaultyBlobStore {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn put(
        &self,
        content: ByteStream,
        original_filename: &str,
        max_bytes: Option<u64>,
    ) -> AppResult<StoredBlob> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(AppError::with_source(
                ErrorKind::StorageWrite,
                "Failed to create blob",
                permission_denied("storage root is read-only"),
            ));
        }
        self.inner.put(content, original_filename, max_bytes).await
    }

    async fn get(&self, stored_name: &str) -> AppResult<ByteStream> {
        self.inner.get(stored_name).await
    }

    async fn size(&self, stored_name: &str) -> AppResult<u64> {
        self.inner.size(stored_name).await
    }

    async fn delete(&self, stored_name: &str) -> AppResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::with_source(
                ErrorKind::StorageDelete,
                format!("Failed to delete blob: {stored_name}"),
                permission_denied("blob is not removable"),
            ));
        }
        self.inner.delete(stored_name).await
    }

    async fn list(&self) -> AppResult<Vec<BlobEntry>> {
        self.inner.list().await
    }
}

/// Registry that can be told to fail inserts or deletes.
#[derive(Debug)]
pub struct FaultyRegistry {
    inner: Arc<dyn DocumentRegistry>,
    fail_create: AtomicBool,
    fail_delete: AtomicBool,
}

impl FaultyRegistry {
    /// Wrap a working registry.
    pub fn new(inner: Arc<dyn DocumentRegistry>) -> Self {
        Self {
            inner,
            fail_create: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
        }
    }

    /// Make `create` fail.
    pub fn fail_creates(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Make `delete` fail.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentRegistry for FaultyRegistry {
    async fn create(&self, new: &NewDocument) -> AppResult<Document> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::persistence("Failed to create document: database is locked"));
        }
        self.inner.create(new).await
    }

    async fn list(&self) -> AppResult<Vec<DocumentSummary>> {
        self.inner.list().await
    }

    async fn list_records(&self) -> AppResult<Vec<Document>> {
        self.inner.list_records().await
    }

    async fn get(&self, id: DocumentId) -> AppResult<Option<Document>> {
        self.inner.get(id).await
    }

    async fn delete(&self, id: DocumentId) -> AppResult<bool> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::persistence("Failed to delete document: database is locked"));
        }
        self.inner.delete(id).await
    }

    async fn count(&self) -> AppResult<u64> {
        self.inner.count().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

/// A service over a temporary directory and an in-memory registry, with
/// both stores wrapped for fault injection.
#[derive(Debug)]
pub struct Fixture {
    /// Blob store root. Removed on drop.
    pub dir: tempfile::TempDir,
    /// Blob store handle shared with the service.
    pub blobs: Arc<FaultyBlobStore>,
    /// Registry handle shared with the service.
    pub registry: Arc<FaultyRegistry>,
    /// The service under test.
    pub service: DocumentService,
}

impl Fixture {
    /// Fixture with default storage settings.
    pub async fn new() -> Self {
        Self::with_config(StorageConfig::default()).await
    }

    /// Fixture with custom storage settings. `root_path` is replaced by a
    /// temporary directory.
    pub async fn with_config(mut config: StorageConfig) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        config.root_path = dir.path().display().to_string();

        let local = LocalBlobStore::new(dir.path()).await.expect("open blob store");
        let db = DatabasePool::in_memory().await.expect("open registry");
        run_migrations(db.pool()).await.expect("migrate registry");

        let blobs = Arc::new(FaultyBlobStore::new(Arc::new(local)));
        let registry = Arc::new(FaultyRegistry::new(Arc::new(DocumentRepository::new(
            db.into_pool(),
        ))));
        let service = DocumentService::new(config, blobs.clone(), registry.clone());

        Self {
            dir,
            blobs,
            registry,
            service,
        }
    }

    /// Upload `content` as a PDF with its size declared.
    pub async fn upload(&self, filename: &str, content: Bytes) -> AppResult<Document> {
        self.service
            .upload(UploadRequest {
                original_filename: filename.to_string(),
                content_type: Some("application/pdf".to_string()),
                declared_size: Some(content.len() as u64),
                body: from_bytes(content),
            })
            .await
    }

    /// Download a document into memory.
    pub async fn download_bytes(&self, id: DocumentId) -> AppResult<Bytes> {
        let download = self.service.download(id).await?;
        collect(download.stream)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::StorageRead, "Failed to read blob", e))
    }

    /// Names of every file in the blob store root, sorted.
    pub async fn blob_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut dir = tokio::fs::read_dir(self.dir.path()).await.expect("read root");
        while let Some(entry) = dir.next_entry().await.expect("read entry") {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        names
    }
}

/// `len` bytes that start like a PDF.
pub fn pdf_bytes(len: usize) -> Bytes {
    let header = b"%PDF-1.7\n";
    let body: Vec<u8> = header
        .iter()
        .copied()
        .chain((0..).map(|i: u32| (i % 251) as u8))
        .take(len)
        .collect();
    Bytes::from(body)
}
