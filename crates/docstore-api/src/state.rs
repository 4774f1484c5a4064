//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use docstore_core::config::AppConfig;
use docstore_service::DocumentService;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Document lifecycle orchestration.
    pub documents: Arc<DocumentService>,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(config: AppConfig, documents: DocumentService) -> Self {
        Self {
            config: Arc::new(config),
            documents: Arc::new(documents),
        }
    }
}
