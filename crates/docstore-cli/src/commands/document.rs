//! Document commands: list, upload, delete.

use std::path::PathBuf;

use clap::Args;
use tokio_util::io::ReaderStream;

use docstore_core::config::AppConfig;
use docstore_core::error::{AppError, ErrorKind};
use docstore_core::types::DocumentId;
use docstore_service::UploadRequest;
use docstore_service::document::download::content_type_for;

use crate::output::{self, DocumentRow, OutputFormat};

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub file: PathBuf,

    /// Declared MIME type; guessed from the extension when omitted
    #[arg(long)]
    pub content_type: Option<String>,

    /// Override the stored display name
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Document ID
    pub id: i64,
}

/// List documents.
pub async fn list(config: AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let (state, db) = docstore_api::build_state(config).await?;
    let documents = state.documents.list().await;
    db.close().await;
    let documents = documents?;

    match format {
        OutputFormat::Json => output::print_json(&documents),
        OutputFormat::Table => {
            let rows: Vec<DocumentRow> = documents.into_iter().map(DocumentRow::from).collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}

/// Upload a file from disk through the same lifecycle as the HTTP API.
pub async fn upload(
    args: &UploadArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let file = tokio::fs::File::open(&args.file).await.map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Validation
        };
        AppError::with_source(kind, format!("Cannot open {}", args.file.display()), e)
    })?;
    let declared_size = file.metadata().await.ok().map(|m| m.len());

    let original_filename = args.name.clone().unwrap_or_else(|| {
        args.file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    });
    let content_type = args
        .content_type
        .clone()
        .unwrap_or_else(|| content_type_for(&original_filename).to_string());

    let (state, db) = docstore_api::build_state(config).await?;
    let result = state
        .documents
        .upload(UploadRequest {
            original_filename,
            content_type: Some(content_type),
            declared_size,
            body: Box::pin(ReaderStream::new(file)),
        })
        .await;
    db.close().await;
    let document = result?;

    match format {
        OutputFormat::Json => output::print_json(&document.summary()),
        OutputFormat::Table => {
            output::print_success(&format!("Uploaded as document {}", document.id));
            output::print_list(&[DocumentRow::from(document)], format);
        }
    }
    Ok(())
}

/// Delete a document.
pub async fn delete(args: &DeleteArgs, config: AppConfig) -> Result<(), AppError> {
    let id = DocumentId::new(args.id);
    let (state, db) = docstore_api::build_state(config).await?;
    let result = state.documents.delete(id).await;
    db.close().await;
    result?;

    output::print_success(&format!("Deleted document {id}"));
    Ok(())
}
