//! Deletion lifecycle: blob first, record second.

use tracing::{debug, error, info};

use docstore_core::error::{AppError, ErrorKind};
use docstore_core::result::AppResult;
use docstore_core::types::DocumentId;

use super::service::DocumentService;

impl DocumentService {
    /// Delete a document's blob and then its record.
    ///
    /// If the blob cannot be removed the record is kept, so the delete can
    /// be retried later. A blob that is already gone counts as removed.
    pub async fn delete(&self, id: DocumentId) -> AppResult<()> {
        let document = self.find(id).await?;

        debug!(document_id = %id, stored_name = %document.stored_name, "Deleting blob");
        match self.blobs.delete(&document.stored_name).await {
            Ok(()) => {}
            Err(e) if e.is(ErrorKind::NotFound) => {
                debug!(document_id = %id, "Blob already absent");
            }
            Err(e) if e.is(ErrorKind::Validation) => {
                error!(
                    document_id = %id,
                    stored_name = %document.stored_name,
                    error = %e,
                    "Record has an invalid stored name and cannot be removed"
                );
                return Err(AppError::with_source(
                    ErrorKind::StorageDelete,
                    format!(
                        "Document {id} has an invalid stored name '{}' and cannot be removed",
                        document.stored_name
                    ),
                    e,
                ));
            }
            Err(e) => {
                error!(
                    document_id = %id,
                    stored_name = %document.stored_name,
                    error = %e,
                    "Blob deletion failed, keeping record"
                );
                return Err(match e.kind {
                    ErrorKind::StorageDelete => e,
                    _ => AppError::with_source(
                        ErrorKind::StorageDelete,
                        format!("Failed to delete content of document {id}"),
                        e,
                    ),
                });
            }
        }

        debug!(document_id = %id, "Deleting record");
        let removed = self.registry.delete(id).await.map_err(|e| {
            error!(
                document_id = %id,
                error = %e,
                "Blob removed but record deletion failed"
            );
            e
        })?;
        if !removed {
            // A concurrent delete won the race.
            return Err(AppError::not_found(format!("Document {id} not found")));
        }

        info!(document_id = %id, stored_name = %document.stored_name, "Document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use docstore_database::DocumentRegistry;
    use docstore_entity::document::NewDocument;

    use super::*;
    use crate::testing::{Fixture, pdf_bytes};

    #[tokio::test]
    async fn test_delete_removes_blob_and_record() {
        let fx = Fixture::new().await;
        let doc = fx.upload("report.pdf", pdf_bytes(100)).await.unwrap();

        fx.service.delete(doc.id).await.unwrap();
        assert!(fx.blob_names().await.is_empty());
        assert!(fx.service.list().await.unwrap().is_empty());

        let err = fx.service.delete(doc.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_unknown_changes_nothing() {
        let fx = Fixture::new().await;
        fx.upload("keep.pdf", pdf_bytes(5)).await.unwrap();

        let err = fx.service.delete(DocumentId::new(999)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(fx.blob_names().await.len(), 1);
        assert_eq!(fx.registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_blob_delete_failure_keeps_record() {
        let fx = Fixture::new().await;
        let doc = fx.upload("report.pdf", pdf_bytes(100)).await.unwrap();
        fx.blobs.fail_deletes(true);

        let err = fx.service.delete(doc.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::StorageDelete);
        assert!(fx.service.get(doc.id).await.is_ok());
        assert_eq!(fx.blob_names().await, vec![doc.stored_name.clone()]);

        fx.blobs.fail_deletes(false);
        fx.service.delete(doc.id).await.unwrap();
        assert!(fx.blob_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_stored_name_keeps_record() {
        let fx = Fixture::new().await;
        let doc = fx
            .registry
            .create(&NewDocument {
                original_filename: "escape.pdf".to_string(),
                stored_name: "../escape.pdf".to_string(),
                size_bytes: 3,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let err = fx.service.delete(doc.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::StorageDelete);
        assert!(err.message.contains("invalid stored name"));
        assert_eq!(fx.registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_with_blob_already_gone() {
        let fx = Fixture::new().await;
        let doc = fx.upload("report.pdf", pdf_bytes(100)).await.unwrap();
        tokio::fs::remove_file(fx.dir.path().join(&doc.stored_name))
            .await
            .unwrap();

        fx.service.delete(doc.id).await.unwrap();
        assert_eq!(fx.registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_deletes_single_winner() {
        let fx = Fixture::new().await;
        let doc = fx.upload("report.pdf", pdf_bytes(100)).await.unwrap();

        let (a, b) = tokio::join!(fx.service.delete(doc.id), fx.service.delete(doc.id));
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| e.is(ErrorKind::NotFound))
        );
    }
}
