//! Response DTOs.

use serde::{Deserialize, Serialize};

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
}
