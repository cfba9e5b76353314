//! Configuration management for ThumbHash placeholders.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file only
//! overrides the keys it names.

mod types;
mod validate;

pub use types::*;
pub use validate::MAX_SAMPLE_SIZE;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Sample thumbnail and pixel extraction settings
    pub sampling: SamplingConfig,

    /// Placeholder rendering settings
    pub render: RenderConfig,

    /// Cache namespace toggles
    pub cache: CacheConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.thumbhash.thumbhash/config.toml
    /// - Linux: ~/.config/thumbhash/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\thumbhash\config\config.toml
    ///
    /// Falls back to ~/.thumbhash/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "thumbhash", "thumbhash")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".thumbhash").join("config.toml")
            })
    }

    /// Get the resolved cache directory (with ~ expansion).
    pub fn cache_dir(&self) -> PathBuf {
        let path_str = self.general.cache_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Directory for sample thumbnails generated during encoding.
    pub fn thumbs_dir(&self) -> PathBuf {
        self.cache_dir().join("thumbs")
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Engine;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sampling.engine, Engine::Basic);
        assert_eq!(config.sampling.sample_max_size, 100);
        assert_eq!(config.render.blur_radius, 1.0);
        assert!(!config.general.strict_errors);
        assert!(config.cache.encode);
        assert!(config.cache.decode);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[sampling]"));
        assert!(toml.contains("engine = \"basic\""));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [sampling]
            engine = "high-fidelity"

            [render]
            blur_radius = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.sampling.engine, Engine::HighFidelity);
        assert_eq!(config.sampling.sample_max_size, 100);
        assert_eq!(config.render.blur_radius, 2.5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_toml_validates() {
        let err = Config::from_toml("[sampling]\nsample_max_size = 500\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nstrict_errors = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.general.strict_errors);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let parsed = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.sampling.engine, config.sampling.engine);
        assert_eq!(parsed.general.cache_dir, config.general.cache_dir);
    }

    #[test]
    fn test_cache_dir_paths() {
        let mut config = Config::default();
        config.general.cache_dir = PathBuf::from("/tmp/thumbhash-test");
        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/thumbhash-test"));
        assert_eq!(
            config.thumbs_dir(),
            PathBuf::from("/tmp/thumbhash-test/thumbs")
        );
    }
}
