//! Application builder: wires storage, registry, and service into an Axum
//! server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use docstore_core::config::AppConfig;
use docstore_core::error::{AppError, ErrorKind};
use docstore_database::migration::run_migrations;
use docstore_database::{DatabasePool, DocumentRepository};
use docstore_service::DocumentService;
use docstore_storage::LocalBlobStore;

use crate::router::build_router;
use crate::state::AppState;

/// Open the blob store and the registry, apply migrations, and assemble
/// the shared state.
pub async fn build_state(config: AppConfig) -> Result<(AppState, DatabasePool), AppError> {
    info!(root = %config.storage.root_path, "Opening blob store");
    let blobs = LocalBlobStore::new(&config.storage.root_path).await?;

    ensure_database_dir(&config.database.url).await?;
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;

    let registry = DocumentRepository::new(db.pool().clone());
    let documents = DocumentService::new(
        config.storage.clone(),
        Arc::new(blobs),
        Arc::new(registry),
    );

    Ok((AppState::new(config, documents), db))
}

/// Runs the DocStore server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting DocStore v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let (state, db) = build_state(config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Configuration, format!("Failed to bind {addr}"), e)
    })?;
    info!("DocStore listening on {addr}");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, draining in-flight requests...");
        let _ = shutdown_tx.send(true);
    });

    let deadline = async move {
        let _ = shutdown_rx.wait_for(|stopping| *stopping).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;
        }
        _ = deadline => {
            warn!(grace_seconds = grace.as_secs(), "Shutdown grace period elapsed, dropping open connections");
        }
    }

    db.close().await;
    info!("DocStore server shut down gracefully");
    Ok(())
}

/// Create the parent directory of a file-backed SQLite URL.
async fn ensure_database_dir(url: &str) -> Result<(), AppError> {
    let Some(path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        return Ok(());
    }

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to create database directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
    }
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
