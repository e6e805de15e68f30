//! Migration tool configuration.
//!
//! Settings come from an optional TOML file (section `[migrate]`) overlaid
//! with `INDEXSMITH__MIGRATE__*` environment variables. Command-line flags
//! override both.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_FILE: &str = "config/indexsmith.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MigrateConfig {
    /// Target database dialect; only `postgres` is supported
    #[serde(default = "default_dialect")]
    pub dialect: String,
    /// Separator written after each emitted statement
    #[serde(default = "default_statement_delimiter")]
    pub statement_delimiter: String,
    #[serde(default = "default_models_file")]
    pub models_file: PathBuf,
}

fn default_dialect() -> String {
    "postgres".to_string()
}

fn default_statement_delimiter() -> String {
    ";".to_string()
}

fn default_models_file() -> PathBuf {
    PathBuf::from("models.toml")
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            statement_delimiter: default_statement_delimiter(),
            models_file: default_models_file(),
        }
    }
}

impl MigrateConfig {
    /// Load from `config/indexsmith.toml`, falling back to env vars and defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from `path` (optional) plus environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("INDEXSMITH").separator("__"))
            .build()?;

        match settings.get::<MigrateConfig>("migrate") {
            Ok(config) => Ok(config),
            // No [migrate] section anywhere: every setting keeps its default
            Err(ConfigError::NotFound(_)) => {
                log::debug!("no [migrate] settings in {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Message(format!(
                "Migration configuration could not be loaded from {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = MigrateConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, MigrateConfig::default());
        assert_eq!(config.dialect, "postgres");
        assert_eq!(config.statement_delimiter, ";");
        assert_eq!(config.models_file, PathBuf::from("models.toml"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("indexsmith.toml");
        fs::write(
            &path,
            "[migrate]\nstatement_delimiter = \";;\"\nmodels_file = \"schema/models.toml\"\n",
        )
        .unwrap();

        let config = MigrateConfig::load_from(&path).unwrap();
        assert_eq!(config.dialect, "postgres");
        assert_eq!(config.statement_delimiter, ";;");
        assert_eq!(config.models_file, PathBuf::from("schema/models.toml"));
    }
}
