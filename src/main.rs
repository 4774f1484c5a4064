//! DocStore Server: PDF document upload and retrieval service.
//!
//! Loads configuration, initialises logging, and hands over to the API
//! crate's server loop.

use tracing_subscriber::{EnvFilter, fmt};

use docstore_core::config::AppConfig;
use docstore_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = docstore_api::run_server(config).await {
        tracing::error!(code = e.kind.code(), "Server error: {}", e.message);
        std::process::exit(1);
    }
}

/// Load configuration from `DOCSTORE_CONFIG`, or from the layered
/// `config/` directory selected by `DOCSTORE_ENV`.
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("DOCSTORE_CONFIG") {
        Ok(path) => AppConfig::load_from(&path),
        Err(_) => {
            let env = std::env::var("DOCSTORE_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
