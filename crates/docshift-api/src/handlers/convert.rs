//! Conversion handlers.
//!
//! Every endpoint is the same sequence: receive the upload into a scratch
//! job, run the operation's pipeline, answer with the artifact inline.

use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::Response;

use docshift_converter::{ConversionRequest, Operation, ResizeSpec};

use crate::error::{ApiError, NO_FILE_UPLOADED, RESIZE_DIMENSIONS_REQUIRED};
use crate::extractors::{UploadForm, receive_upload};
use crate::state::AppState;

type MultipartBody = Result<Multipart, MultipartRejection>;

/// POST /convert-word-to-pdf
pub async fn word_to_pdf(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    convert(state, Operation::WordToPdf, multipart).await
}

/// POST /convert-pdf-to-word
pub async fn pdf_to_word(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    convert(state, Operation::PdfToWord, multipart).await
}

/// POST /convert-jpg-to-pdf
pub async fn image_to_pdf(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    convert(state, Operation::ImageToPdf, multipart).await
}

/// POST /convert-pdf-to-jpg
pub async fn pdf_to_image(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    convert(state, Operation::PdfToImage, multipart).await
}

/// POST /convert-png-to-jpg
pub async fn png_to_jpg(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    convert(state, Operation::PngToJpg, multipart).await
}

/// POST /convert-excel-to-pdf
pub async fn spreadsheet_to_pdf(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    convert(state, Operation::SpreadsheetToPdf, multipart).await
}

/// POST /resize-jpg (form fields `width` and/or `height`)
pub async fn resize_image(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    convert(state, Operation::ResizeImage, multipart).await
}

/// POST /resize-pdf
pub async fn compress_pdf(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    convert(state, Operation::CompressPdf, multipart).await
}

/// POST /convert
pub async fn downgrade_pdf(
    State(state): State<AppState>,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    convert(state, Operation::DowngradePdf, multipart).await
}

async fn convert(
    state: AppState,
    operation: Operation,
    multipart: MultipartBody,
) -> Result<Response, ApiError> {
    let form = receive_upload(multipart, &state.scratch, operation.field_name()).await?;

    let UploadForm { job, upload, fields } = form;
    let Some(upload) = upload else {
        job.finish().await;
        return Err(ApiError::bad_request(NO_FILE_UPLOADED));
    };

    let resize = if operation == Operation::ResizeImage {
        let field = |name: &str| fields.get(name).map(String::as_str);
        match ResizeSpec::from_form(field("width"), field("height")) {
            Ok(spec) => Some(spec),
            Err(_) => {
                job.finish().await;
                return Err(ApiError::bad_request(RESIZE_DIMENSIONS_REQUIRED));
            }
        }
    } else {
        None
    };

    tracing::info!(
        operation = %operation,
        job_id = %job.id(),
        original_name = %upload.original_name,
        size = upload.size,
        "Conversion requested"
    );

    let output = state
        .processor
        .convert(ConversionRequest {
            operation,
            job,
            upload,
            resize,
        })
        .await
        .map_err(|e| ApiError::conversion(operation, e))?;

    Response::builder()
        .header(header::CONTENT_TYPE, output.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename={}", output.filename),
        )
        .body(Body::from(output.bytes))
        .map_err(|e| {
            ApiError::from(docshift_core::AppError::internal(format!(
                "Response build failed: {e}"
            )))
        })
}
