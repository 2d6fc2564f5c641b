//! Runtime configuration.
//!
//! An explicit struct passed into constructors — there is no process-wide
//! singleton. Hosts typically deserialize it from a small JSON file; every
//! field has a default so an empty object is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database location.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory where new tracker files are created. Optional — hosts that
    /// only read and update existing trackers don't need it.
    #[serde(default)]
    pub trackers_dir: Option<PathBuf>,
}

fn default_database_path() -> PathBuf {
    crate::db::default_database_path().unwrap_or_else(|| PathBuf::from("jobtrail.db"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            trackers_dir: None,
        }
    }
}

/// Loads a config from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation {
            message: "database_path must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert!(config.database_path.ends_with("jobtrail.db"));
        assert!(config.trackers_dir.is_none());
    }

    #[test]
    fn test_explicit_paths() {
        let config = load_config_from_str(
            r#"{"database_path": "/srv/jobs.db", "trackers_dir": "/vault/trackers"}"#,
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/srv/jobs.db"));
        assert_eq!(config.trackers_dir, Some(PathBuf::from("/vault/trackers")));
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let err = load_config_from_str(r#"{"database_path": ""}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = load_config_from_str("not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"database_path": "/srv/jobs.db"}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/srv/jobs.db"));
    }

    #[test]
    fn test_missing_file_error() {
        let err = load_config("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
