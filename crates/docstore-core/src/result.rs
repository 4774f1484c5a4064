//! Convenience result type alias for DocStore.

use crate::error::AppError;

/// A specialized `Result` type for DocStore operations.
pub type AppResult<T> = Result<T, AppError>;
