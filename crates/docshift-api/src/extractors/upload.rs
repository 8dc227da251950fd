//! Multipart upload extraction.
//!
//! The expected file field is streamed straight into a fresh scratch job;
//! other text fields are collected for the handler.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use tokio::io::AsyncWriteExt;

use docshift_converter::{ScratchJob, ScratchSpace, Upload};

use crate::error::{ApiError, NO_FILE_UPLOADED};

/// Message returned when the body cannot be parsed as multipart.
const MALFORMED_UPLOAD: &str = "Malformed multipart body.";

/// A parsed conversion form.
#[derive(Debug)]
pub struct UploadForm {
    /// The request's scratch job; the upload lives inside it.
    pub job: ScratchJob,
    /// The expected file, `None` when absent or empty.
    pub upload: Option<Upload>,
    /// Non-file form fields by name.
    pub fields: HashMap<String, String>,
}

/// Read a multipart body, persisting the `file_field` part to a new
/// scratch job.
///
/// A file part with an empty filename and no bytes counts as absent.
/// A second part with the same name is rejected.
pub async fn receive_upload(
    multipart: Result<Multipart, MultipartRejection>,
    scratch: &ScratchSpace,
    file_field: &str,
) -> Result<UploadForm, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "Request body is not multipart");
        ApiError::bad_request(NO_FILE_UPLOADED)
    })?;

    let mut job = scratch.create_job().await?;
    let mut upload: Option<Upload> = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            if upload.is_some() {
                return Err(ApiError::bad_request(format!(
                    "Only one '{file_field}' file may be uploaded."
                )));
            }
            upload = persist(field, &mut job).await?;
        } else if field.file_name().is_none() {
            let value = field.text().await.map_err(malformed)?;
            fields.insert(name, value);
        }
    }

    Ok(UploadForm {
        job,
        upload,
        fields,
    })
}

async fn persist(mut field: Field<'_>, job: &mut ScratchJob) -> Result<Option<Upload>, ApiError> {
    let original_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let path = job.upload_path(&original_name);

    let mut file = tokio::fs::File::create(&path).await?;
    let mut size = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;

    if original_name.is_empty() && size == 0 {
        return Ok(None);
    }

    tracing::debug!(
        job_id = %job.id(),
        original_name = %original_name,
        size,
        "Upload received"
    );

    Ok(Some(Upload {
        original_name,
        content_type,
        path,
        size,
    }))
}

/// Map a multipart read error, keeping 413 for bodies over the limit.
fn malformed(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!(error = %err.body_text(), "Upload exceeds body limit");
        return ApiError::payload_too_large();
    }
    tracing::debug!(error = %err.body_text(), "Malformed multipart body");
    ApiError::bad_request(MALFORMED_UPLOAD)
}
