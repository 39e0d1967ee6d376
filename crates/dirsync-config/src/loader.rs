//! Configuration loader utilities

use crate::{ConfigBuilder, ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `DIRSYNC__SYNC__DELETE_MISSING=true`
pub const ENV_PREFIX: &str = "DIRSYNC";

/// Configuration loader with common loading patterns
pub struct ConfigLoader;

impl ConfigLoader {
    /// Start a builder seeded with defaults, the given (or first default)
    /// configuration file and the environment
    pub fn builder(explicit: Option<&Path>) -> ConfigResult<ConfigBuilder> {
        let mut builder = ConfigBuilder::new().add_defaults();

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.to_path_buf(),
                    });
                }
                builder = builder.add_source_file(path);
            }
            None => {
                if let Some(path) = Self::config_exists() {
                    builder = builder.add_source_file(path);
                }
            }
        }

        Ok(builder.add_env_prefix(ENV_PREFIX))
    }

    /// Get default configuration file paths in order of preference
    fn get_default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("dirsync.yaml"),
            PathBuf::from("dirsync.yml"),
            PathBuf::from("dirsync.toml"),
            PathBuf::from(".dirsync.yaml"),
            PathBuf::from(".dirsync.yml"),
            PathBuf::from(".dirsync.toml"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let dirsync_dir = config_dir.join("dirsync");
            paths.push(dirsync_dir.join("config.yaml"));
            paths.push(dirsync_dir.join("config.toml"));
        }

        paths
    }

    /// Check if a configuration file exists in default locations
    pub fn config_exists() -> Option<PathBuf> {
        Self::get_default_config_paths()
            .into_iter()
            .find(|path| path.exists())
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME").ok().map(|home| {
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
            })
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|home| PathBuf::from(home).join(".config"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
