//! Unified error type for the conversion pipelines.
//!
//! Subsystem errors (process execution, raster decoding, PDF assembly,
//! scratch I/O) are consolidated into [`ConversionError`]. Errors raised by
//! a pipeline stage remember that [`Stage`] so the HTTP layer can pick the
//! short message the client sees while the full error is only logged.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::executor::ExecutorError;

/// A step inside a conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Office document rendered to PDF.
    Render,
    /// PDF rewritten to an older compatibility level.
    Downgrade,
    /// PDF recompressed with a lossy preset.
    Compress,
    /// First PDF page rasterized to JPEG.
    Rasterize,
    /// PDF-to-docx script run through the interpreter.
    Script,
    /// In-process decode/resample/encode of a raster image.
    Raster,
    /// In-process embedding of an image into a one-page PDF.
    Embed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render => write!(f, "render"),
            Self::Downgrade => write!(f, "downgrade"),
            Self::Compress => write!(f, "compress"),
            Self::Rasterize => write!(f, "rasterize"),
            Self::Script => write!(f, "script"),
            Self::Raster => write!(f, "raster"),
            Self::Embed => write!(f, "embed"),
        }
    }
}

/// Unified error type for all conversion operations.
#[derive(Debug, Error)]
pub enum ConversionError {
    // --- External tool errors ---
    /// An external converter could not be run or exited unsuccessfully.
    #[error("{stage} step failed: {source}")]
    Tool {
        /// The stage that invoked the tool.
        stage: Stage,
        /// The executor failure.
        #[source]
        source: ExecutorError,
    },

    /// The tool reported success but its output is absent or empty.
    #[error("{stage} step produced no output at {path}")]
    OutputMissing {
        /// The stage that should have produced the file.
        stage: Stage,
        /// Expected output path.
        path: PathBuf,
    },

    // --- In-process errors ---
    /// An in-process step failed; the cause is one of the variants below.
    #[error("{stage} step failed: {source}")]
    Step {
        /// The in-process stage.
        stage: Stage,
        /// The underlying failure.
        #[source]
        source: Box<ConversionError>,
    },

    /// Decoding or encoding a raster image failed.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    /// Building the PDF object graph failed.
    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The upload is neither JPEG nor PNG.
    #[error("Unsupported image format for '{name}'")]
    UnsupportedImage {
        /// Original filename of the upload.
        name: String,
    },

    /// Neither a usable width nor a usable height was supplied.
    #[error("Width or height must be provided")]
    InvalidResize,

    // --- Generic errors ---
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tokio blocking task join error.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ConversionError {
    /// Wrap an executor failure with the stage that ran it.
    pub fn tool(stage: Stage, source: ExecutorError) -> Self {
        Self::Tool { stage, source }
    }

    /// Attribute an in-process failure to `stage`. Errors that already
    /// carry a stage, and client input errors, are returned unchanged.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            Self::Tool { .. }
            | Self::OutputMissing { .. }
            | Self::Step { .. }
            | Self::InvalidResize => self,
            other => Self::Step {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage the error was raised in, when known.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Tool { stage, .. }
            | Self::OutputMissing { stage, .. }
            | Self::Step { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the failure is a tool that succeeded without producing output.
    pub fn is_missing_output(&self) -> bool {
        matches!(self, Self::OutputMissing { .. })
    }

    /// Diagnostic text captured from the failing tool, if any.
    pub fn tool_stderr(&self) -> Option<&str> {
        match self {
            Self::Tool {
                source: ExecutorError::ProcessFailed { stderr, .. },
                ..
            } => Some(stderr.as_str()),
            _ => None,
        }
    }
}
