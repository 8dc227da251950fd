//! Route definitions for the DocShift HTTP API.
//!
//! Conversion routes live at the root, next to `/_diagnostics` and
//! `/health`. Anything else falls through to the static asset directory
//! when it exists.

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use docshift_converter::Operation;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.server.max_upload_bytes as usize;
    let cors = middleware::cors::build_cors_layer(&state.config.server);

    let mut router = conversion_routes()
        .route("/_diagnostics", get(handlers::diagnostics::diagnostics))
        .route("/health", get(handlers::health::health));

    let static_dir = Path::new(&state.config.server.static_dir);
    if static_dir.is_dir() {
        router = router.fallback_service(ServeDir::new(static_dir));
    } else {
        tracing::debug!(dir = %static_dir.display(), "Static directory not found, assets disabled");
    }

    router
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// The nine conversion endpoints.
fn conversion_routes() -> Router<AppState> {
    use handlers::convert;

    Router::new()
        .route(Operation::WordToPdf.route(), post(convert::word_to_pdf))
        .route(Operation::PdfToWord.route(), post(convert::pdf_to_word))
        .route(Operation::ImageToPdf.route(), post(convert::image_to_pdf))
        .route(Operation::PdfToImage.route(), post(convert::pdf_to_image))
        .route(Operation::PngToJpg.route(), post(convert::png_to_jpg))
        .route(Operation::SpreadsheetToPdf.route(), post(convert::spreadsheet_to_pdf))
        .route(Operation::ResizeImage.route(), post(convert::resize_image))
        .route(Operation::CompressPdf.route(), post(convert::compress_pdf))
        .route(Operation::DowngradePdf.route(), post(convert::downgrade_pdf))
}
