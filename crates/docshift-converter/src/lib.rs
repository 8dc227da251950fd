//! # docshift-converter
//!
//! Conversion pipelines behind the DocShift gateway.
//!
//! Every pipeline follows the same shape: the upload already sits in a
//! per-request [`ScratchJob`], each stage registers its output path on the
//! job before running, external converters are spawned with explicit
//! argument vectors through the [`ToolExecutor`], and the job directory is
//! removed once the final artifact has been read into memory.
//!
//! The [`Diagnostics`] probe reports whether the external converters are
//! installed without performing any conversion.

pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod models;
pub mod pdf;
pub mod processor;
pub mod raster;
pub mod scratch;
pub mod tools;

pub use diagnostics::{Diagnostics, DiagnosticsReport, ToolCheck};
pub use error::{ConversionError, Stage};
pub use executor::{ExecutionOutcome, ExecutorError, ToolExecutor, ToolInvocation};
pub use models::{ConversionOutput, ConversionRequest, Operation, ResizeSpec, Upload};
pub use processor::ConversionProcessor;
pub use scratch::{ScratchJob, ScratchSpace};
pub use tools::ToolCommands;
