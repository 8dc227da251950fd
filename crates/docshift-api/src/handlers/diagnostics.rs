//! Dependency diagnostics handler.

use axum::Json;
use axum::extract::State;

use docshift_converter::DiagnosticsReport;

use crate::state::AppState;

/// GET /_diagnostics
///
/// Always answers 200; failures are reported inside the body.
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    Json(state.diagnostics.run().await)
}
