//! # docshift-api
//!
//! HTTP layer for DocShift built on Axum.
//!
//! Exposes the nine conversion endpoints, the dependency diagnostics and
//! health routes, static asset serving, CORS and request logging, and maps
//! errors to plain-text HTTP responses.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
