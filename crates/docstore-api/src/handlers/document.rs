//! Document upload, listing, download, and delete handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use futures::stream;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio::sync::mpsc;

use docstore_core::error::AppError;
use docstore_core::traits::storage::ByteStream;
use docstore_core::types::DocumentId;
use docstore_entity::document::DocumentSummary;
use docstore_service::UploadRequest;

use crate::dto::response::{DeleteResponse, UploadResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Chunks buffered between the request body and the blob writer.
const UPLOAD_CHANNEL_DEPTH: usize = 8;

/// RFC 5987 `attr-char` complement.
const FILENAME_STAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// POST /api/upload
///
/// Streams the `file` field straight into the blob store.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(String::from);

        let (tx, rx) = mpsc::channel(UPLOAD_CHANNEL_DEPTH);
        let body: ByteStream = Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (chunk, rx))
        }));

        let request = UploadRequest {
            original_filename,
            content_type,
            declared_size: None,
            body,
        };
        let (_, result) = tokio::join!(pump_field(field, tx), state.documents.upload(request));
        let document = result?;

        return Ok(Json(UploadResponse {
            message: "Uploaded successfully".to_string(),
            id: document.id,
        }));
    }

    Err(AppError::validation("No file uploaded").into())
}

/// Forward a multipart field into the upload channel until it ends, fails,
/// or the receiving side gives up.
async fn pump_field(mut field: Field<'_>, tx: mpsc::Sender<Result<Bytes, std::io::Error>>) {
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if tx.send(Ok(chunk)).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let _ = tx.send(Err(std::io::Error::other(e.to_string()))).await;
                break;
            }
        }
    }
}

/// GET /api/documents
pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentSummary>>, ApiError> {
    Ok(Json(state.documents.list().await?))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentSummary>, ApiError> {
    let document = state.documents.get(parse_id(&id)?).await?;
    Ok(Json(document.summary()))
}

/// GET /api/documents/{id}/download
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let download = state.documents.download(parse_id(&id)?).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.content_type)
        .header(header::CONTENT_LENGTH, download.document.size())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&download.document.original_filename),
        )
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.documents.delete(parse_id(&id)?).await?;
    Ok(Json(DeleteResponse { deleted: true }))
}

fn parse_id(raw: &str) -> Result<DocumentId, AppError> {
    raw.parse::<DocumentId>()
        .map_err(|_| AppError::validation(format!("Invalid document id '{raw}'")))
}

/// `attachment` disposition naming the original file.
///
/// Non-ASCII names get an ASCII fallback plus an RFC 5987 `filename*`.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            utf8_percent_encode(filename, FILENAME_STAR)
        )
    }
}
