//! Conversion pipeline and diagnostics configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings shared by every conversion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConverterConfig {
    /// Maximum number of conversion pipelines running at once.
    /// Further requests wait for a free slot.
    #[validate(range(min = 1, max = 64))]
    pub max_concurrent_jobs: usize,
    /// Per-invocation timeout for external tools; `0` disables it.
    pub tool_timeout_seconds: u64,
    /// JPEG quality for in-process encodes.
    #[validate(range(min = 1, max = 100))]
    pub jpeg_quality: u8,
    /// Ghostscript `-dCompatibilityLevel` used by downgrade and compress.
    #[validate(length(min = 3, max = 3))]
    pub pdf_compatibility_level: String,
    /// Ghostscript `-dPDFSETTINGS` preset used by the compress operation.
    pub compress_preset: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            tool_timeout_seconds: 0,
            jpeg_quality: 80,
            pdf_compatibility_level: "1.4".to_string(),
            compress_preset: "/ebook".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Effective tool timeout, `None` when unlimited.
    pub fn tool_timeout(&self) -> Option<Duration> {
        (self.tool_timeout_seconds > 0).then(|| Duration::from_secs(self.tool_timeout_seconds))
    }
}

/// Settings for the `/_diagnostics` dependency probe.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Timeout applied to each probe command.
    #[validate(range(min = 1, max = 120))]
    pub timeout_seconds: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { timeout_seconds: 8 }
    }
}

impl DiagnosticsConfig {
    /// Probe timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
