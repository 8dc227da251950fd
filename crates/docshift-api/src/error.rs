//! Maps domain errors to HTTP responses.
//!
//! Responses carry only the short client-facing message as plain text.
//! Server-side failures are logged with their full source chain.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use docshift_converter::{ConversionError, Operation};
use docshift_core::error::{AppError, ErrorKind};

/// Message returned when the expected file field is absent.
pub const NO_FILE_UPLOADED: &str = "No file uploaded.";
/// Message returned when a resize request has no usable dimension.
pub const RESIZE_DIMENSIONS_REQUIRED: &str = "Width or height must be provided.";
/// Message returned when the body exceeds `server.max_upload_bytes`.
pub const UPLOAD_TOO_LARGE: &str = "Upload exceeds the size limit.";

/// HTTP-facing wrapper around [`AppError`].
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

impl ApiError {
    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(AppError::validation(message))
    }

    /// Map a failed conversion to its per-operation message.
    pub fn conversion(operation: Operation, err: ConversionError) -> Self {
        if matches!(err, ConversionError::InvalidResize) {
            return Self::bad_request(RESIZE_DIMENSIONS_REQUIRED);
        }
        let message = operation.failure_message(&err);
        Self(AppError::with_source(ErrorKind::ExternalTool, message, err))
    }

    /// 413 for a body over the upload limit.
    pub fn payload_too_large() -> Self {
        Self(AppError::new(ErrorKind::PayloadTooLarge, UPLOAD_TOO_LARGE))
    }

    /// HTTP status for the wrapped error kind.
    pub fn status(&self) -> StatusCode {
        match self.0.kind {
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            kind if kind.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Scratch I/O failures while receiving an upload; the path stays in the log.
impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self(AppError::with_source(
            ErrorKind::Storage,
            "Failed to store upload.",
            err,
        ))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let AppError {
            kind,
            message,
            source,
        } = self.0;

        if status.is_server_error() {
            match source {
                Some(source) => tracing::error!(
                    kind = %kind,
                    message = %message,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(kind = %kind, message = %message, "Request failed"),
            }
        } else {
            tracing::debug!(kind = %kind, message = %message, "Request rejected");
        }

        (status, message).into_response()
    }
}
