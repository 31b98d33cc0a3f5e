//! API configuration module.
//!
//! Loaded from an optional TOML file with `MOSTRADOR_*` environment
//! variables layered on top. Nothing secret has a default.
//!
//! ## Sources (later wins)
//! 1. Built-in defaults
//! 2. `mostrador.toml` (or the file named by `MOSTRADOR_CONFIG`)
//! 3. Environment, e.g. `MOSTRADOR_BIND_ADDR=127.0.0.1:9000`

use config::{Config, Environment, File};
use mostrador_core::BusinessClock;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "mostrador.toml";

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen address. Default: `0.0.0.0:8080`
    pub bind_addr: String,

    /// SQLite database file. Default: `./mostrador.db`
    pub database_path: String,

    /// Pool size. Default: 5
    pub max_connections: u32,

    /// Business timezone as a fixed UTC offset in hours. Default: -4
    pub utc_offset_hours: i32,

    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,

    /// Allow cross-origin requests from any origin (SPA served elsewhere).
    pub cors_allow_any: bool,
}

impl ApiConfig {
    /// Loads configuration from `MOSTRADOR_CONFIG` (or `mostrador.toml`)
    /// and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("MOSTRADOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(path)
    }

    /// Loads configuration from `path` (optional) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("database_path", "./mostrador.db")?
            .set_default("max_connections", 5)?
            .set_default("utc_offset_hours", -4)?
            .set_default("log_json", false)?
            .set_default("cors_allow_any", false)?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("MOSTRADOR").try_parsing(true))
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        self.clock()?;
        Ok(())
    }

    /// The business clock for the configured offset.
    pub fn clock(&self) -> Result<BusinessClock, ConfigError> {
        BusinessClock::from_hours(self.utc_offset_hours)
            .ok_or_else(|| ConfigError::InvalidValue("utc_offset_hours".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}
