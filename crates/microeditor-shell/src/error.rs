//! Errors that end a shell run.

use std::io;
use std::path::PathBuf;

use microeditor_bus::BusError;
use microeditor_config::ConfigError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Errors that end a shell run.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Configuration could not be loaded.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Loader failure.
        #[from]
        source: ConfigError,
    },
    /// Telemetry could not be installed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Subscriber failure.
        #[from]
        source: TelemetryError,
    },
    /// The async runtime could not be built.
    #[error("failed to start the async runtime: {source}")]
    Runtime {
        /// Runtime builder failure.
        #[source]
        source: io::Error,
    },
    /// The document could not be read.
    #[error("failed to read document '{}': {source}", .path.display())]
    Document {
        /// Path that was read.
        path: PathBuf,
        /// Read failure.
        #[source]
        source: io::Error,
    },
    /// The host and editor failed to complete the session.
    #[error("envelope bus failure: {source}")]
    Bus {
        /// Bus failure.
        #[from]
        source: BusError,
    },
    /// The session summary could not be written.
    #[error("failed to write session summary: {source}")]
    Output {
        /// Write failure.
        #[source]
        source: io::Error,
    },
}
