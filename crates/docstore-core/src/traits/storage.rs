//! Blob store trait for durable, name-addressed document content.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading and writing blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Outcome of a successful [`BlobStore::put`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredBlob {
    /// Generated name the blob lives under.
    pub stored_name: String,
    /// Exact number of bytes written.
    pub size_bytes: u64,
}

/// A blob found while scanning the store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BlobEntry {
    /// File name within the store root.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modification time, if the platform reports one.
    pub modified_at: Option<DateTime<Utc>>,
    /// Whether this is an unfinished write left behind by a crash.
    pub partial: bool,
}

/// Trait for blob storage backends.
///
/// Names handed to `get` and `delete` are untrusted: implementations must
/// refuse anything that could address a path outside their root.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g. `"local"`).
    fn provider_type(&self) -> &str;

    /// Check whether the backend is reachable and writable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Stream `content` into a new blob whose name is derived from
    /// `original_filename` plus a unique component.
    ///
    /// When `max_bytes` is set and the stream yields more, the write is
    /// aborted with a validation error. On any failure nothing is left
    /// behind in the store.
    async fn put(
        &self,
        content: ByteStream,
        original_filename: &str,
        max_bytes: Option<u64>,
    ) -> AppResult<StoredBlob>;

    /// Open a blob for reading. Fails with `NotFound` when absent.
    async fn get(&self, stored_name: &str) -> AppResult<ByteStream>;

    /// Size of a blob in bytes. Fails with `NotFound` when absent.
    async fn size(&self, stored_name: &str) -> AppResult<u64>;

    /// Remove a blob. A blob that is already absent counts as success.
    async fn delete(&self, stored_name: &str) -> AppResult<()>;

    /// List every blob in the store, including unfinished writes.
    async fn list(&self) -> AppResult<Vec<BlobEntry>>;
}
