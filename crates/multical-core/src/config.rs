//! Engine configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/multical/config.toml` by default:
//!
//! ```toml
//! active_calendar = "work"
//!
//! [display]
//! no_events_text = "Nothing planned"
//!
//! [[calendars]]
//! name = "work"
//! timezone = "America/New_York"
//!
//! [logging]
//! level = "debug"
//! format = "compact"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

use crate::tracing::{TracingConfig, TracingOutputFormat};

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is well-formed TOML but not acceptable.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Configuration for the calendar engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Calendar selected when a session starts.
    pub active_calendar: Option<String>,

    /// Display settings.
    pub display: DisplaySettings,

    /// Calendars created when a session starts.
    pub calendars: Vec<CalendarSettings>,

    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Display settings for rendered listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Text returned when a day has no events.
    pub no_events_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            no_events_text: "No events on this date".to_string(),
        }
    }
}

/// A calendar to create at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSettings {
    pub name: String,
    /// IANA timezone identifier.
    pub timezone: String,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set.
    pub level: String,
    pub format: TracingOutputFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: TracingOutputFormat::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("multical")
            .join("config.toml")
    }

    /// Builds the tracing configuration described by `[logging]`.
    pub fn tracing_config(&self) -> Result<TracingConfig, ConfigError> {
        let level: Level = self
            .logging
            .level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.logging.level)))?;
        Ok(TracingConfig::for_format(self.logging.format).with_level(level))
    }
}
