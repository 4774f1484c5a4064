//! Document use cases.

pub mod delete;
pub mod download;
pub mod service;
pub mod upload;
pub mod verify;

pub use download::DocumentDownload;
pub use service::{DocumentService, ServiceHealth};
pub use upload::UploadRequest;
pub use verify::{ConsistencyReport, MissingBlob, SizeMismatch};
