//! Errors raised while assembling the effective configuration

use dirsync_types::Error as DirsyncError;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file named on the command line does not exist
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was given
        path: PathBuf,
    },

    /// A required sync setting is absent or empty
    #[error("{key} cannot be empty")]
    MissingRequired {
        /// Dotted key, e.g. `source`
        key: String,
    },

    /// A setting is present but unusable
    #[error("invalid value for '{key}': {message}")]
    InvalidValue {
        /// Dotted key
        key: String,
        /// What is wrong with it
        message: String,
    },

    /// Settings are individually fine but contradict each other
    #[error("invalid configuration: {message}")]
    Validation {
        /// What is wrong
        message: String,
    },

    /// Merging or deserializing the layered sources failed
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Built-in defaults could not be turned into a config layer
    #[error("failed to encode default configuration: {0}")]
    Defaults(#[from] serde_yaml::Error),
}

impl From<ConfigError> for DirsyncError {
    fn from(error: ConfigError) -> Self {
        DirsyncError::config(error.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new missing required error
    pub fn missing_required<S: Into<String>>(key: S) -> Self {
        Self::MissingRequired { key: key.into() }
    }

    /// Create a new invalid value error
    pub fn invalid_value<S: Into<String>>(key: S, message: S) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
