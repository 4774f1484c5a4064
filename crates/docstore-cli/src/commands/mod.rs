//! CLI command definitions and dispatch.

pub mod document;
pub mod migrate;
pub mod serve;
pub mod verify;

use clap::{Parser, Subcommand};

use docstore_core::config::AppConfig;
use docstore_core::error::AppError;

use crate::output::OutputFormat;

/// DocStore: PDF document upload and retrieval service
#[derive(Debug, Parser)]
#[command(name = "docstore", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file. Without it, `config/default` and
    /// `config/$DOCSTORE_ENV` are layered.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Apply database migrations
    Migrate,
    /// List stored documents, newest first
    List,
    /// Upload a local file
    Upload(document::UploadArgs),
    /// Delete a document and its content
    Delete(document::DeleteArgs),
    /// Check that every record has its blob and vice versa
    Verify(verify::VerifyArgs),
}

impl Cli {
    /// Whether this invocation runs the long-lived server.
    pub fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve(_))
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(self.config.as_deref())?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate => migrate::execute(config).await,
            Commands::List => document::list(config, self.format).await,
            Commands::Upload(args) => document::upload(args, config, self.format).await,
            Commands::Delete(args) => document::delete(args, config).await,
            Commands::Verify(args) => verify::execute(args, config, self.format).await,
        }
    }
}

/// Helper: load configuration from an explicit file or the environment.
pub fn load_config(path: Option<&str>) -> Result<AppConfig, AppError> {
    match path {
        Some(path) => AppConfig::load_from(path),
        None => {
            let env = std::env::var("DOCSTORE_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}
