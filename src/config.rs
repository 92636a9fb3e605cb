//! Application configuration loaded from `flashcards.toml`.

use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "flashcards.toml";
pub const DATABASE_ENV: &str = "FLASHCARDS_DB";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    /// Used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("flashcards.sqlite3"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the file if it exists, otherwise defaults. `FLASHCARDS_DB`
    /// overrides the database path either way.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = match fs::read_to_string(path.as_ref()) {
            Ok(contents) => Self::from_toml(&contents)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err.into()),
        };

        if let Some(db) = std::env::var_os(DATABASE_ENV) {
            config.database_path = PathBuf::from(db);
        }
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::from_toml(r#"database_path = "/tmp/cards.db""#).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/cards.db"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_file() {
        assert!(matches!(
            Config::from_toml("log_level = 3"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flashcards.toml");
        fs::write(&path, "log_level = \"debug\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.log_level, "debug");
    }
}
