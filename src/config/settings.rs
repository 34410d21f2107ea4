//! User configuration settings
//!
//! Layered configuration: defaults → config file → environment variables → CLI args

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};
use crate::session::SessionDefaults;

/// File name of the session database inside the data directory
const DATABASE_FILE: &str = "sessions.db";

/// File name of the TUI log inside the data directory
const LOG_FILE: &str = "session-manager.log";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the session database (defaults to the data directory)
    pub database_path: Option<PathBuf>,

    /// UI refresh rate in FPS
    pub ui_refresh_fps: u32,

    /// Enable debug logging
    pub debug: bool,

    /// Log file path for TUI mode (defaults to the data directory)
    pub log_file: Option<PathBuf>,

    /// Values seeded into sessions that were never saved
    pub new_session: SessionDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            ui_refresh_fps: 30,
            debug: false,
            log_file: None,
            new_session: SessionDefaults::default(),
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration using a specific config file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config: Config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Layer config file if it exists
            .merge(Toml::file(config_path))
            // Layer environment variables (SM_DATABASE_PATH, SM_NEW_SESSION__PORT, etc.)
            .merge(Env::prefixed("SM_").split("__"))
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the session database path
    pub fn database_path(&self) -> Result<PathBuf> {
        match self.database_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join(DATABASE_FILE)),
        }
    }

    /// Get the log file path used in TUI mode
    pub fn log_file_path(&self) -> Result<PathBuf> {
        match self.log_file {
            Some(ref path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join(LOG_FILE)),
        }
    }

    /// Create the config and data directories
    pub fn ensure_directories(&self) -> Result<()> {
        let dirs = Self::project_dirs()?;
        create_dir(dirs.config_dir())?;
        create_dir(dirs.data_dir())
    }

    /// Write this configuration as TOML to `config_path`
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            create_dir(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        std::fs::write(config_path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "session-manager", "session-manager").ok_or_else(|| {
            Error::Config(ConfigError::LoadFailed(
                "Could not determine home directory".to_string(),
            ))
        })
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .map_err(|_| Error::Config(ConfigError::DirectoryCreationFailed(dir.to_path_buf())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database_path, None);
        assert_eq!(config.ui_refresh_fps, 30);
        assert!(!config.debug);
        assert_eq!(config.new_session.hostname, "127.0.0.1");
        assert_eq!(config.new_session.username, "root");
        assert_eq!(config.new_session.port, 3306);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("ui_refresh_fps"));
        assert!(toml.contains("[new_session]"));
        assert!(toml.contains("3306"));
    }

    #[test]
    fn test_explicit_database_path() {
        let config = Config {
            database_path: Some(PathBuf::from("/tmp/custom.db")),
            ..Config::default()
        };
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/custom.db"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "database_path = \"/srv/sessions.db\"\n\n[new_session]\nusername = \"app\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("/srv/sessions.db")));
        assert_eq!(config.new_session.username, "app");
        // Unset keys keep their defaults
        assert_eq!(config.new_session.hostname, "127.0.0.1");
        assert_eq!(config.new_session.port, 3306);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.ui_refresh_fps = 10;
        config.new_session.port = 3307;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.ui_refresh_fps, 10);
        assert_eq!(loaded.new_session.port, 3307);
    }
}
