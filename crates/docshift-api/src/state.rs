//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use docshift_converter::{ConversionProcessor, Diagnostics, ScratchSpace};
use docshift_core::{AppConfig, AppResult};
use docshift_core::error::{AppError, ErrorKind};

/// Shared dependencies, passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Scratch root holding per-request job directories.
    pub scratch: ScratchSpace,
    /// Runs conversion pipelines.
    pub processor: Arc<ConversionProcessor>,
    /// Dependency probe.
    pub diagnostics: Arc<Diagnostics>,
}

impl AppState {
    /// Build state from configuration, creating the scratch root.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let root = config.storage.scratch_root();
        let scratch = ScratchSpace::new(&root).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to prepare scratch directory '{}'", root.display()),
                e,
            )
        })?;

        Ok(Self {
            processor: Arc::new(ConversionProcessor::new(&config)),
            diagnostics: Arc::new(Diagnostics::new(&config, scratch.clone())),
            scratch,
            config: Arc::new(config),
        })
    }
}
