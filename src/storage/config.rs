//! Configuration handling for taskman
//!
//! Configuration is read from `config.toml` in the platform config directory
//! (e.g. `~/.config/taskman/config.toml`), or from the file named by
//! `TASKMAN_CONFIG`. Every key is optional; CLI flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::json_file::DEFAULT_MAX_FILES;

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "TASKMAN_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default storage file for the task collection
    pub storage_file: PathBuf,

    /// Refuse to save when the storage directory holds this many files
    /// with the storage extension
    pub max_storage_files: usize,

    /// Colored terminal output
    pub color: bool,

    /// Format used by `export` when none is given
    pub default_export_format: String,

    /// Whether `export` includes statistics by default
    pub include_statistics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_file: PathBuf::from("tasks_cli.json"),
            max_storage_files: DEFAULT_MAX_FILES,
            color: true,
            default_export_format: "json".to_string(),
            include_statistics: true,
        }
    }
}

impl Config {
    /// Returns the global config directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "taskman", "taskman").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the config file in use: `$TASKMAN_CONFIG`, else the platform default
    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| Self::config_dir().map(|dir| dir.join("config.toml")))
    }

    /// Loads configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage_file cannot be empty".to_string()));
        }
        if self.max_storage_files == 0 {
            return Err(ConfigError::Invalid(
                "max_storage_files must be at least 1".to_string(),
            ));
        }
        if !crate::export::is_format_supported(&self.default_export_format) {
            return Err(ConfigError::Invalid(format!(
                "default_export_format '{}' is not one of json, xml, xlsx, excel",
                self.default_export_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();

        assert_eq!(config.storage_file, PathBuf::from("tasks_cli.json"));
        assert_eq!(config.max_storage_files, 150);
        assert!(config.color);
        assert!(config.include_statistics);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
storage_file = "/tmp/my_tasks.json"
color = false
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage_file, PathBuf::from("/tmp/my_tasks.json"));
        assert!(!config.color);
        assert_eq!(config.max_storage_files, 150);
        assert_eq!(config.default_export_format, "json");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn serialized_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            max_storage_files: 10,
            default_export_format: "xml".to_string(),
            ..Config::default()
        };
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_storage_files = 0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn malformed_toml_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "color = \"maybe").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }
}
