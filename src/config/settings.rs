//! Application settings loading.
//!
//! Settings come from an optional `config.toml` and are then overridden by
//! environment variables (usually loaded from `.env` by `dotenvy`). Every field
//! has a default, so an empty or missing file yields a runnable configuration.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default number of rows returned by the CSV export.
pub const DEFAULT_EXPORT_ROW_LIMIT: u64 = 2000;

/// Top-level settings, mirroring the sections of config.toml
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Database connection settings
    pub database: DatabaseSettings,
    /// HTTP server settings
    pub server: ServerSettings,
    /// CSV export settings
    pub export: ExportSettings,
}

/// `[database]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `SeaORM` connection URL (`sqlite://...` or `postgres://...`)
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address the API listens on
    pub bind_address: String,
    /// Shared secret between bot and API; empty disables the check
    pub api_key: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            api_key: String::new(),
        }
    }
}

/// `[export]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportSettings {
    /// Maximum number of rows in one CSV export
    pub row_limit: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            row_limit: DEFAULT_EXPORT_ROW_LIMIT,
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse config.toml: {e}"),
        })
    }

    /// Applies overrides from a variable lookup (normally the process environment).
    ///
    /// Recognized variables: `DATABASE_URL`, `API_KEY`, `BIND_ADDRESS` and
    /// `EXPORT_ROW_LIMIT`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(api_key) = lookup("API_KEY") {
            self.server.api_key = api_key;
        }
        if let Some(bind_address) = lookup("BIND_ADDRESS") {
            self.server.bind_address = bind_address;
        }
        if let Some(limit) = lookup("EXPORT_ROW_LIMIT") {
            self.export.row_limit = limit.parse().map_err(|e| Error::Config {
                message: format!("EXPORT_ROW_LIMIT must be a positive integer: {e}"),
            })?;
        }
        Ok(self)
    }
}

/// Loads settings from `path` if it exists, falling back to defaults otherwise.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path:?}: {e}"),
    })?;
    Settings::from_toml_str(&contents)
}

/// Loads ./config.toml and applies environment overrides.
pub fn load_default_settings() -> Result<Settings> {
    load_settings("config.toml")?.with_overrides(|key| std::env::var(key).ok())
}
