//! # docstore-core
//!
//! Core crate for DocStore. Contains the blob storage trait, configuration
//! schemas, the document identifier type, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DocStore crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
