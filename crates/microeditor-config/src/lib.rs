//! Shared configuration for the envelope bus and the editor shell.
//!
//! Configuration is plain serde data with a default for every field, so a
//! partial JSON document is always a valid configuration. The shell layers
//! command-line flags and `MICROEDITOR_*` environment variables over the
//! file; libraries only ever see the resolved [`BusConfig`].

mod bus;
mod defaults;
mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bus::{BusConfig, UnhandledRequestPolicy};
pub use defaults::{
    DEFAULT_INIT_POLL_INTERVAL_MS, DEFAULT_INIT_POLL_MAX_ATTEMPTS, DEFAULT_LOG_FILTER,
    default_init_poll_interval_ms, default_init_poll_max_attempts, default_log_filter,
    default_log_filter_string, default_log_format,
};
pub use logging::LogFormat;

/// Resolved configuration for a shell process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `tracing` filter expression.
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Settings applied to every bus the process creates.
    pub bus: BusConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            bus: BusConfig::default(),
        }
    }
}

impl Config {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid JSON or a
    /// field has the wrong shape.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: None,
            source,
        })
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its content is invalid.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Filter expression for the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for the tracing subscriber.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Settings for buses created by this process.
    #[must_use]
    pub const fn bus(&self) -> &BusConfig {
        &self.bus
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration '{}': {source}", .path.display())]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration document was invalid.
    #[error("invalid configuration{}: {source}", describe_path(.path.as_deref()))]
    Parse {
        /// File the document came from, when it came from a file.
        path: Option<PathBuf>,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },
}

fn describe_path(path: Option<&Path>) -> String {
    path.map(|value| format!(" in '{}'", value.display())).unwrap_or_default()
}
