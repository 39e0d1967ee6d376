//! Configuration management system for dirsync
//!
//! Configuration is layered: built-in defaults, then an optional YAML, TOML or
//! JSON file, then `DIRSYNC__*` environment variables, then explicit
//! overrides (the command line). The merged result is validated before any
//! scanning begins: a missing or empty source, an empty destination, or a
//! source that does not exist are rejected here.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dirsync_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("dirsync.yaml")
//!     .add_env_prefix("DIRSYNC")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Delete missing: {}", config.sync.delete_missing);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Log levels accepted by `logging.level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for dirsync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// What to mirror and how
    pub sync: SyncConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate the merged configuration
    pub fn validate(&self) -> ConfigResult<()> {
        self.sync.validate()?;
        self.logging.validate()
    }
}

/// Mirror run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Source directory for synchronization process
    pub source: Option<PathBuf>,
    /// Destination directory for synchronization process
    pub destination: Option<PathBuf>,
    /// Deletes all files from destination directory that are not present in source directory
    #[serde(default)]
    pub delete_missing: bool,
    /// Plan and log every action without touching the destination
    #[serde(default)]
    pub dry_run: bool,
}

impl SyncConfig {
    /// Source path, once validated
    pub fn source(&self) -> ConfigResult<&Path> {
        non_empty(self.source.as_deref()).ok_or_else(|| ConfigError::missing_required("source"))
    }

    /// Destination path, once validated
    pub fn destination(&self) -> ConfigResult<&Path> {
        non_empty(self.destination.as_deref())
            .ok_or_else(|| ConfigError::missing_required("destination"))
    }

    fn validate(&self) -> ConfigResult<()> {
        let source = self.source()?;
        self.destination()?;

        if !source.exists() {
            return Err(ConfigError::invalid_value(
                "source".to_string(),
                format!("source directory does not exist: {}", source.display()),
            ));
        }
        Ok(())
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|path| !path.as_os_str().is_empty())
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level, overridden by `RUST_LOG`
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            colored_output: true,
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(ConfigError::validation(
                "Log level must be one of: trace, debug, info, warn, error",
            ));
        }
        Ok(())
    }
}
