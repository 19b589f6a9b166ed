//! Command-line interface of the shell.
//!
//! Every configuration flag can also be supplied through a `MICROEDITOR_*`
//! environment variable. Flags win over the environment, which wins over the
//! configuration file.

use std::path::PathBuf;

use clap::Parser;
use microeditor_config::{Config, LogFormat, UnhandledRequestPolicy};

/// Runs a host and a scratch editor over an in-process envelope bus.
#[derive(Parser, Debug, Clone)]
#[command(name = "microeditor-shell", version)]
pub struct Cli {
    /// Document to open in the scratch editor.
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// JSON configuration file.
    #[arg(long = "config", env = "MICROEDITOR_CONFIG", value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Language reported to the editor; defaults to the file extension.
    #[arg(long, env = "MICROEDITOR_LANGUAGE")]
    pub language: Option<String>,

    /// Text appended by the scratch editor as its demonstration edit.
    #[arg(long, default_value = "<!-- edited in microeditor-shell -->")]
    pub edit: String,

    /// Tracing filter expression, for example `microeditor_bus=debug`.
    #[arg(long, env = "MICROEDITOR_LOG_FILTER")]
    pub log_filter: Option<String>,

    /// Log output format (`json` or `compact`).
    #[arg(long, env = "MICROEDITOR_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Default request deadline in milliseconds.
    #[arg(long, env = "MICROEDITOR_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// What to do with requests nobody handles (`respond_with_error` or `drop`).
    #[arg(long, env = "MICROEDITOR_UNHANDLED_REQUESTS")]
    pub unhandled_requests: Option<UnhandledRequestPolicy>,

    /// Wait between initialisation attempts in milliseconds.
    #[arg(long, env = "MICROEDITOR_INIT_POLL_INTERVAL_MS")]
    pub init_poll_interval_ms: Option<u64>,

    /// Initialisation attempts before giving up.
    #[arg(long, env = "MICROEDITOR_INIT_POLL_MAX_ATTEMPTS")]
    pub init_poll_max_attempts: Option<u32>,
}

impl Cli {
    /// Applies the flags that were given on top of `config`.
    #[must_use]
    pub fn overlay(&self, mut config: Config) -> Config {
        if let Some(filter) = &self.log_filter {
            config.log_filter.clone_from(filter);
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(timeout) = self.request_timeout_ms {
            config.bus.request_timeout_ms = Some(timeout);
        }
        if let Some(policy) = self.unhandled_requests {
            config.bus.unhandled_requests = policy;
        }
        if let Some(interval) = self.init_poll_interval_ms {
            config.bus.init_poll_interval_ms = interval;
        }
        if let Some(attempts) = self.init_poll_max_attempts {
            config.bus.init_poll_max_attempts = attempts;
        }
        config
    }

    /// Language to report, from the flag or the document extension.
    #[must_use]
    pub fn resolved_language(&self) -> String {
        self.language.clone().unwrap_or_else(|| {
            self.document
                .extension()
                .map_or_else(|| String::from("text"), |ext| ext.to_string_lossy().to_lowercase())
        })
    }
}
