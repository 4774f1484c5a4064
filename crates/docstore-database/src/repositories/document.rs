//! Document repository implementation.

use async_trait::async_trait;
use sqlx::SqlitePool;

use docstore_core::error::{AppError, ErrorKind};
use docstore_core::result::AppResult;
use docstore_core::types::DocumentId;
use docstore_entity::document::{Document, DocumentSummary, NewDocument};

use crate::registry::DocumentRegistry;

/// SQLite-backed document registry.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRegistry for DocumentRepository {
    async fn create(&self, new: &NewDocument) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (original_filename, stored_name, size_bytes, created_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, original_filename, stored_name, size_bytes, created_at",
        )
        .bind(&new.original_filename)
        .bind(&new.stored_name)
        .bind(new.size_bytes)
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to create document", e))
    }

    async fn list(&self) -> AppResult<Vec<DocumentSummary>> {
        sqlx::query_as::<_, DocumentSummary>(
            "SELECT id, original_filename, size_bytes, created_at \
             FROM documents ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to list documents", e))
    }

    async fn list_records(&self) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT id, original_filename, stored_name, size_bytes, created_at \
             FROM documents ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to load documents", e))
    }

    async fn get(&self, id: DocumentId) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT id, original_filename, stored_name, size_bytes, created_at \
             FROM documents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Failed to find document", e))
    }

    async fn delete(&self, id: DocumentId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Persistence, "Failed to delete document", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Persistence, "Failed to count documents", e)
            })?;
        Ok(total as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Persistence, "Health check failed", e))
    }
}
