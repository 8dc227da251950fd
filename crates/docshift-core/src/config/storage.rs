//! Scratch storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where uploads and intermediate artifacts live while a request runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of the per-request scratch directories.
    pub scratch_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scratch_dir: "uploads".to_string(),
        }
    }
}

impl StorageConfig {
    /// Scratch root as a path.
    pub fn scratch_root(&self) -> PathBuf {
        PathBuf::from(&self.scratch_dir)
    }
}
