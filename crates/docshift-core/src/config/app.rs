//! Server and CORS configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    #[validate(range(min = 1))]
    pub port: u16,
    /// Maximum accepted request body in bytes (multipart uploads).
    #[validate(range(min = 1024))]
    pub max_upload_bytes: u64,
    /// Directory of static front-end assets served as the router fallback.
    pub static_dir: String,
    /// Graceful shutdown timeout in seconds.
    pub shutdown_grace_seconds: u64,
    /// CORS configuration.
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload(),
            static_dir: default_static_dir(),
            shutdown_grace_seconds: default_shutdown_grace(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
///
/// An origin is accepted when its host is listed in `allowed_hosts` and its
/// port equals the server port, or when it matches an `extra_origins`
/// entry exactly. Requests without an `Origin` header are always accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Hostnames treated as same-origin / local development.
    pub allowed_hosts: Vec<String>,
    /// Additional fully qualified origins, e.g. `https://convert.example.com`.
    pub extra_origins: Vec<String>,
    /// Max age for preflight cache in seconds.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
            extra_origins: Vec::new(),
            max_age_seconds: default_max_age(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5005
}

fn default_max_upload() -> u64 {
    104_857_600 // 100 MiB
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_shutdown_grace() -> u64 {
    30
}

fn default_allowed_hosts() -> Vec<String> {
    vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
        "0.0.0.0".to_string(),
    ]
}

fn default_max_age() -> u64 {
    3600
}
