use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::{info, warn};

use super::options::AppOptions;

const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "photoroll";
const APP_NAME: &str = "photoroll";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("toml deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

/// Loads and saves [`AppOptions`] as a toml file.
pub struct ConfigStorage {
    config_dir: PathBuf,
}

impl ConfigStorage {
    /// Creates storage rooted at the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration directory cannot be
    /// determined.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::ConfigDirNotFound)?;

        Ok(Self { config_dir })
    }

    /// Creates storage rooted at a specific directory (useful for testing).
    #[must_use]
    pub fn with_dir(path: PathBuf) -> Self {
        Self { config_dir: path }
    }

    /// Returns the configuration directory path.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn ensure_config_dir(&self) -> Result<(), ConfigError> {
        if !self.config_dir.exists() {
            info!("Creating configuration directory at {:?}", self.config_dir);
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Loads the options, writing a default file when none exists. A
    /// malformed file falls back to defaults without being overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or created.
    pub fn load(&self) -> Result<AppOptions, ConfigError> {
        self.ensure_config_dir()?;
        let config_path = self.config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!("Config file not found at {:?}, creating default.", config_path);
            let defaults = AppOptions::default();
            Self::save_to_file(&config_path, &defaults)?;
            return Ok(defaults);
        }

        let content = fs::read_to_string(&config_path)?;
        match toml::from_str::<AppOptions>(&content) {
            Ok(options) => Ok(options),
            Err(e) => {
                warn!("Failed to parse config file: {}. Using defaults.", e);
                Ok(AppOptions::default())
            }
        }
    }

    /// Saves the options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save(&self, options: &AppOptions) -> Result<(), ConfigError> {
        self.ensure_config_dir()?;
        let config_path = self.config_dir.join(CONFIG_FILE_NAME);
        Self::save_to_file(&config_path, options)
    }

    fn save_to_file(path: &Path, options: &AppOptions) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(options)?;

        let parent = path
            .parent()
            .ok_or_else(|| std::io::Error::other("Invalid path"))?;
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default_if_missing() {
        let dir = tempdir().unwrap();
        let storage = ConfigStorage::with_dir(dir.path().to_path_buf());

        let options = storage.load().unwrap();
        assert!(options.browser.support_thumbnails);
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_load_handles_malformed_file() {
        let dir = tempdir().unwrap();
        let storage = ConfigStorage::with_dir(dir.path().to_path_buf());
        let config_file = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&config_file, "invalid_toml = [").unwrap();

        let options = storage.load().unwrap();
        assert_eq!(options, AppOptions::default());
        let content = fs::read_to_string(&config_file).unwrap();
        assert_eq!(content, "invalid_toml = [");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let storage = ConfigStorage::with_dir(dir.path().to_path_buf());

        let mut options = AppOptions::default();
        options.browser.maximum_selection = 3;
        options.cache.max_disk_bytes = 1024;

        storage.save(&options).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded, options);
    }
}
