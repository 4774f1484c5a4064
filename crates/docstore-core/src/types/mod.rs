//! Core type definitions used across the DocStore workspace.

pub mod id;

pub use id::DocumentId;
