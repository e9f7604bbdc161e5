//! Service settings.
//!
//! Settings come from an optional TOML file (path in `ACADEMY_CONFIG`, default
//! `./config.toml`) and are then overridden by `DATABASE_URL` and `BIND_ADDRESS`
//! from the environment. A missing file is not an error; a malformed one is.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/academy.sqlite?mode=rwc";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Settings for the ledger service
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// `SeaORM` connection string
    pub database_url: String,
    /// Socket address the HTTP API listens on
    pub bind_address: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl AppConfig {
    /// Parses settings from TOML text. Absent keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse settings: {e}"),
        })
    }

    /// Applies environment overrides on top of the file values.
    #[must_use]
    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(url) = database_url {
            self.database_url = url;
        }
        if let Some(addr) = bind_address {
            self.bind_address = addr;
        }
        self
    }
}

/// Loads settings from a TOML file, or defaults if the file does not exist.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("No settings file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path.display()),
    })?;
    AppConfig::from_toml_str(&contents)
}

/// Loads settings for the running process: file first, then environment.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("ACADEMY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&path)?.with_overrides(
        std::env::var("DATABASE_URL").ok(),
        std::env::var("BIND_ADDRESS").ok(),
    );
    info!(bind_address = %config.bind_address, "Settings loaded");
    Ok(config)
}
