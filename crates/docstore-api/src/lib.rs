//! # docstore-api
//!
//! HTTP API layer for DocStore built on Axum.
//!
//! Provides the document endpoints, CORS and request logging middleware,
//! response DTOs, and the mapping from [`docstore_core::AppError`] to HTTP
//! status codes.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_state, run_server};
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
