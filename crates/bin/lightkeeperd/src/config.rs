//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `lightkeeper.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reconciliation loop settings.
    pub engine: EngineConfig,
    /// Snapshot storage settings.
    pub storage: StorageConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Devices registered at startup when missing.
    pub devices: Vec<DeviceSeed>,
}

/// Reconciliation loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between periodic reconciliation passes.
    pub tick_interval_secs: u64,
}

/// Snapshot storage configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON snapshot file.
    pub path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// A device to register on startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
}

impl Config {
    /// Load configuration from `lightkeeper.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("lightkeeper.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LIGHTKEEPER_TICK_SECS") {
            if let Ok(secs) = val.parse() {
                self.engine.tick_interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("LIGHTKEEPER_STORAGE_PATH") {
            self.storage.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("LIGHTKEEPER_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.tick_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "tick interval must be non-zero".to_string(),
            ));
        }
        if let Some(seed) = self.devices.iter().find(|d| d.id.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "device seed {:?} has an empty id",
                seed.name
            )));
        }
        Ok(())
    }

    /// Time between periodic passes.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.engine.tick_interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 5,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("lightkeeper.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "lightkeeperd=info,lightkeeper_app=info,lightkeeper_adapter_storage_json=info,lightkeeper_adapter_virtual=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
