use crate::core::hash::HashSettings;
use crate::core::split::SplitRatios;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the settings file location.
pub const CONFIG_ENV: &str = "IMAGEPRO_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine a configuration directory")]
    NoConfigDir,

    #[error("Settings file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Defaults remembered between runs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub split: SplitRatios,

    #[serde(default)]
    pub hash: HashSettings,
}

impl Settings {
    /// `$IMAGEPRO_CONFIG`, or `settings.json` under the platform config dir.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join("imagepro").join("settings.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load settings, falling back to defaults when the file is missing or broken.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Settings>(&contents) {
                Ok(settings) => {
                    log::debug!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings file {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("Failed to read settings file {}: {}. Using defaults.", path.display(), e);
                }
                Self::default()
            }
        }
    }

    /// [`Settings::load_from`] when a location is known, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                log::warn!("No settings location available. Using defaults.");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::HashAlgorithm;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.split, SplitRatios::new(70.0, 15.0, 15.0));
        assert_eq!(settings.hash.algorithm, HashAlgorithm::Perceptual);
        assert_eq!(settings.hash.hash_size, 8);
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("settings.json");
        let settings = Settings {
            split: SplitRatios::new(80.0, 10.0, 10.0),
            hash: HashSettings {
                algorithm: HashAlgorithm::Blockhash,
                hash_size: 16,
            },
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Settings::load_from(&temp_dir.path().join("absent.json"));
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_unknown_location_gives_defaults() {
        assert_eq!(Settings::load_or_default(None), Settings::default());
    }

    #[test]
    fn test_known_location_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        let settings = Settings {
            split: SplitRatios::new(60.0, 30.0, 10.0),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_or_default(Some(&path)), settings);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ this is not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{ "split": { "train": 60.0, "val": 20.0, "test": 20.0 } }"#).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.split, SplitRatios::new(60.0, 20.0, 20.0));
        assert_eq!(loaded.hash, HashSettings::default());
    }
}
