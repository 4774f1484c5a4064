//! # docstore-storage
//!
//! Blob storage for DocStore. Blobs live as flat files in one root
//! directory under names generated by [`naming`].

pub mod naming;
pub mod providers;
pub mod stream;

pub use providers::LocalBlobStore;
