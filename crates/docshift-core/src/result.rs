//! Convenience result type alias for DocShift.

use crate::error::AppError;

/// A specialized `Result` type for DocShift operations.
pub type AppResult<T> = Result<T, AppError>;
