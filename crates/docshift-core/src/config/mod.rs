//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files plus `DOCSHIFT__*` environment variables. Each
//! sub-module represents a logical configuration section, and every
//! section carries serde defaults so the gateway starts without any file.

pub mod app;
pub mod converter;
pub mod logging;
pub mod storage;
pub mod tools;

use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::app::ServerConfig;
use self::converter::{ConverterConfig, DiagnosticsConfig};
use self::logging::LoggingConfig;
use self::storage::StorageConfig;
use self::tools::ToolsConfig;

pub use self::app::CorsConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "DOCSHIFT";

/// Legacy environment variable naming the Python interpreter.
pub const PYTHON_BIN_ENV: &str = "PYTHON_BIN";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    #[validate(nested)]
    pub server: ServerConfig,
    /// Scratch storage settings.
    pub storage: StorageConfig,
    /// External tool locations.
    pub tools: ToolsConfig,
    /// Conversion pipeline settings.
    #[validate(nested)]
    pub converter: ConverterConfig,
    /// Dependency probe settings.
    #[validate(nested)]
    pub diagnostics: DiagnosticsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration relative to the current directory.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml`, environment
    /// variables prefixed with `DOCSHIFT__`, and `PYTHON_BIN`.
    pub fn load(env: &str) -> AppResult<Self> {
        Self::load_from(Path::new("config"), env)
    }

    /// Load configuration from an explicit config directory.
    pub fn load_from(config_dir: &Path, env: &str) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(config_dir.join("default.toml")).required(false))
            .add_source(config::File::from(config_dir.join(format!("{env}.toml"))).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("tools.python", std::env::var(PYTHON_BIN_ENV).ok())?
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }
}
