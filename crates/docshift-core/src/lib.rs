//! # docshift-core
//!
//! Core crate for DocShift. Contains the configuration schema and loader,
//! and the unified error system shared by the converter and API crates.
//!
//! This crate has **no** internal dependencies on other DocShift crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
