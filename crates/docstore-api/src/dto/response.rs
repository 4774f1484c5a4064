//! Response DTOs.

use serde::{Deserialize, Serialize};

use docstore_core::types::DocumentId;

/// Body returned by a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Identifier of the new document.
    pub id: DocumentId,
}

/// Body returned by a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Always `true`.
    pub deleted: bool,
}

/// Health probe result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Registry reachable.
    pub database: bool,
    /// Blob store writable.
    pub storage: bool,
}
