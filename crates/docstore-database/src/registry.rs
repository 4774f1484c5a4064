//! Document registry trait.

use async_trait::async_trait;

use docstore_core::result::AppResult;
use docstore_core::types::DocumentId;
use docstore_entity::document::{Document, DocumentSummary, NewDocument};

/// Durable catalogue of document metadata.
///
/// Every method is atomic: an individual call either fully applies or
/// leaves the registry unchanged. Identifiers are never reused.
#[async_trait]
pub trait DocumentRegistry: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a record and return it with its assigned identifier.
    async fn create(&self, new: &NewDocument) -> AppResult<Document>;

    /// All records, newest first.
    async fn list(&self) -> AppResult<Vec<DocumentSummary>>;

    /// Every full record, oldest first. Used by consistency audits.
    async fn list_records(&self) -> AppResult<Vec<Document>>;

    /// Look up a single record.
    async fn get(&self, id: DocumentId) -> AppResult<Option<Document>>;

    /// Remove a record. Returns `true` if it existed.
    async fn delete(&self, id: DocumentId) -> AppResult<bool>;

    /// Number of records.
    async fn count(&self) -> AppResult<u64>;

    /// Check that the registry is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
