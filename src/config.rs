//! Configuration file support.
//!
//! Settings come from an optional TOML file; any key left out takes its
//! default. Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{DatabaseError, storage::JsonFileBackend};

/// Skiff DB settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the registry and one document per table.
    pub data_dir: PathBuf,

    /// File name of the schema registry inside `data_dir`.
    pub registry_file: String,

    /// Ask before `drop_table` and `delete`.
    pub confirm_destructive: bool,

    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            registry_file: "db_meta.json".to_string(),
            confirm_destructive: true,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DatabaseError> {
        let content = std::fs::read_to_string(path).map_err(|e| DatabaseError::io(path, e))?;
        Self::from_toml(path, &content)
    }

    fn from_toml(path: &Path, content: &str) -> Result<Self, DatabaseError> {
        toml::from_str(content).map_err(|source| DatabaseError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Opens the JSON file backend this configuration points at.
    pub fn open_backend(&self) -> Result<JsonFileBackend, DatabaseError> {
        JsonFileBackend::open(&self.data_dir, &self.registry_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = Config::from_toml(Path::new("skiff.toml"), "data_dir = \"/tmp/skiff\"").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/skiff"));
        assert_eq!(config.registry_file, "db_meta.json");
        assert!(config.confirm_destructive);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let err = Config::from_toml(Path::new("skiff.toml"), "colour = \"blue\"").unwrap_err();
        assert!(matches!(err, DatabaseError::Config { .. }));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skiff.toml");
        std::fs::write(&path, "confirm_destructive = false\nlog_level = \"debug\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(!config.confirm_destructive);
        assert_eq!(config.log_level, "debug");

        let missing = Config::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, DatabaseError::BackendIo { .. }));
    }
}
