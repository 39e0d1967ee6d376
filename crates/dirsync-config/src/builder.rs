//! Configuration builder for flexible configuration loading

use crate::{Config, ConfigResult};
use config::{ConfigBuilder as ConfigBuilderInner, Environment, File, FileFormat, Value};
use std::path::{Path, PathBuf};

/// Separator between nested keys in environment variable names
const ENV_SEPARATOR: &str = "__";

/// Configuration builder for loading configuration from multiple sources
#[derive(Debug)]
pub struct ConfigBuilder {
    inner: ConfigBuilderInner<config::builder::DefaultState>,
    sources: Vec<ConfigSource>,
    overrides: Vec<(String, Value)>,
}

#[derive(Debug, Clone)]
enum ConfigSource {
    File { path: PathBuf, format: FileFormat },
    Defaults,
    Environment { prefix: String },
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            inner: config::Config::builder(),
            sources: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Add default configuration values
    pub fn add_defaults(mut self) -> Self {
        self.sources.push(ConfigSource::Defaults);
        self
    }

    /// Add a configuration file source
    pub fn add_source_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = Self::detect_format(&path);
        self.sources.push(ConfigSource::File { path, format });
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.sources.push(ConfigSource::Environment {
            prefix: prefix.into(),
        });
        self
    }

    /// Override a single key (dotted path, e.g. `sync.source`); applied last
    pub fn set_override<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Override a single key only when a value is present
    pub fn set_override_option<K: Into<String>, V: Into<Value>>(
        self,
        key: K,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.set_override(key, value),
            None => self,
        }
    }

    /// Build and validate the configuration
    pub fn build(self) -> ConfigResult<Config> {
        let config = self.build_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the configuration without checking the sync paths
    ///
    /// Used when the caller only needs logging settings before the real
    /// validation happens.
    pub fn build_unvalidated(mut self) -> ConfigResult<Config> {
        // Start with defaults as the base configuration
        let defaults_value = serde_yaml::to_value(Config::default())?;
        self.inner = self
            .inner
            .add_source(config::Config::try_from(&defaults_value)?);

        for source in &self.sources {
            match source {
                ConfigSource::File { path, format } => {
                    if path.exists() {
                        self.inner = self
                            .inner
                            .add_source(File::from(path.clone()).format(*format));
                    }
                }
                ConfigSource::Environment { prefix } => {
                    self.inner = self.inner.add_source(
                        Environment::with_prefix(prefix)
                            .separator(ENV_SEPARATOR)
                            .try_parsing(true),
                    );
                }
                ConfigSource::Defaults => {
                    // Already handled above
                }
            }
        }

        for (key, value) in self.overrides {
            self.inner = self.inner.set_override(key, value)?;
        }

        let config = self.inner.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Detect file format from extension
    fn detect_format(path: &Path) -> FileFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Yaml,
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::io::Write;
    use tempfile::{Builder, TempDir};

    #[test]
    fn test_builder_defaults_need_paths() {
        let result = ConfigBuilder::new().add_defaults().build();
        assert!(matches!(result, Err(ConfigError::MissingRequired { .. })));

        let config = ConfigBuilder::new().add_defaults().build_unvalidated().unwrap();
        assert!(config.sync.source.is_none());
        assert!(!config.sync.delete_missing);
    }

    #[test]
    fn test_builder_yaml_file() {
        let source = TempDir::new().unwrap();
        let mut temp_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            temp_file,
            "sync:\n  source: {}\n  destination: /tmp/dirsync-dst\n  delete_missing: true\nlogging:\n  level: debug\n",
            source.path().display()
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .add_defaults()
            .add_source_file(temp_file.path())
            .build()
            .unwrap();

        assert_eq!(config.sync.source.as_deref(), Some(source.path()));
        assert!(config.sync.delete_missing);
        assert!(!config.sync.dry_run);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_builder_toml_file() {
        let source = TempDir::new().unwrap();
        let mut temp_file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            temp_file,
            "[sync]\nsource = {:?}\ndestination = \"out\"\ndry_run = true\n",
            source.path().display().to_string()
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .add_defaults()
            .add_source_file(temp_file.path())
            .build()
            .unwrap();

        assert!(config.sync.dry_run);
        assert_eq!(config.sync.destination, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let source = TempDir::new().unwrap();
        let mut temp_file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(temp_file, "sync:\n  destination: from-file\n  delete_missing: true\n").unwrap();

        let config = ConfigBuilder::new()
            .add_defaults()
            .add_source_file(temp_file.path())
            .set_override("sync.source", source.path().display().to_string())
            .set_override("sync.destination", "from-cli")
            .set_override_option("sync.dry_run", None::<bool>)
            .build()
            .unwrap();

        assert_eq!(config.sync.destination, Some(PathBuf::from("from-cli")));
        assert!(config.sync.delete_missing);
        assert!(!config.sync.dry_run);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let config = ConfigBuilder::new()
            .add_defaults()
            .add_source_file("/definitely/not/here/dirsync.yaml")
            .build_unvalidated()
            .unwrap();
        assert_eq!(config.logging.level, "info");
    }
}
