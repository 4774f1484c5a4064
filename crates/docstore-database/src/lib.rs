//! # docstore-database
//!
//! SQLite connection management, embedded migrations, and the document
//! registry.

pub mod connection;
pub mod migration;
pub mod registry;
pub mod repositories;

pub use connection::DatabasePool;
pub use registry::DocumentRegistry;
pub use repositories::DocumentRepository;
