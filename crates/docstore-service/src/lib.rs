//! # docstore-service
//!
//! Orchestration layer for DocStore. [`DocumentService`] sequences blob
//! store and registry operations so the two never silently diverge.

pub mod document;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use document::{
    ConsistencyReport, DocumentDownload, DocumentService, ServiceHealth, UploadRequest,
};
