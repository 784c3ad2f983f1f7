//! Configuration file parsing and structures.
//!
//! coverd uses TOML for declarative configuration: system paths, logging and
//! one `[covers.<entry_id>]` table per cover configuration entry. The entry
//! key is the stable entry id used for reload requests; the cover id used in
//! generated configuration is derived from the entry's display name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing_subscriber::filter::LevelFilter;

/// Top-level configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    pub system: SystemConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub covers: HashMap<String, CoverEntryConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,
}

/// System-wide configuration
#[derive(Debug, Deserialize)]
pub struct SystemConfig {
    /// Platform configuration directory. The covers document, the helper
    /// registry store and the positioning script all live below this path.
    pub config_dir: PathBuf,
}

/// One cover configuration entry
#[derive(Debug, Clone, Deserialize)]
pub struct CoverEntryConfig {
    /// Human-readable cover name, e.g. "Bedroom Blind"
    pub name: String,

    /// Entity id of the existing switch controlling the cover motor
    pub switch_entity: String,

    /// Full open-to-close travel time in seconds
    pub travel_time: f64,

    /// Whether this entry is applied by `coverd run`
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        toml::from_str(&contents).map_err(ConfigError::Parse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
