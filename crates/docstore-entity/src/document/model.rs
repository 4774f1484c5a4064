//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docstore_core::types::DocumentId;

/// Metadata for one uploaded document.
///
/// Records are immutable between creation and deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Registry-assigned identifier.
    pub id: DocumentId,
    /// User-supplied display name. Untrusted; never used to build paths.
    pub original_filename: String,
    /// Generated name of the backing blob.
    pub stored_name: String,
    /// Exact byte length of the backing blob.
    pub size_bytes: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Size as an unsigned byte count.
    pub fn size(&self) -> u64 {
        u64::try_from(self.size_bytes).unwrap_or(0)
    }

    /// Public view of the record, without the internal storage name.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            original_filename: self.original_filename.clone(),
            size_bytes: self.size_bytes,
            created_at: self.created_at,
        }
    }
}

/// Data required to create a new document record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    /// Display name supplied by the uploader.
    pub original_filename: String,
    /// Name the blob store generated.
    pub stored_name: String,
    /// Bytes actually written.
    pub size_bytes: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Client-facing listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DocumentSummary {
    /// Document identifier.
    pub id: DocumentId,
    /// Display name.
    pub original_filename: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// When the document was uploaded.
    pub created_at: DateTime<Utc>,
}
