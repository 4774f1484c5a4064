//! Core traits defined in `docstore-core` and implemented by other crates.

pub mod storage;

pub use storage::{BlobEntry, BlobStore, ByteStream, StoredBlob};
