//! Configuration loading for the shell.

use microeditor_config::{Config, ConfigError};

use crate::cli::Cli;

/// Resolves the configuration for one run.
pub trait ConfigLoader: Send + Sync {
    /// Loads the configuration, with command-line flags applied.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration file cannot be read
    /// or parsed.
    fn load(&self, cli: &Cli) -> Result<Config, ConfigError>;
}

/// Reads the optional JSON file named by `--config` and overlays the flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileConfigLoader;

impl ConfigLoader for FileConfigLoader {
    fn load(&self, cli: &Cli) -> Result<Config, ConfigError> {
        let file = cli
            .config_path
            .as_deref()
            .map_or_else(|| Ok(Config::default()), Config::from_path)?;
        Ok(cli.overlay(file))
    }
}
