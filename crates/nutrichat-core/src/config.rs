use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::transport::DEFAULT_BACKEND_URL;

/// Environment variable that overrides the configured backend URL
pub const BACKEND_URL_ENV: &str = "NUTRICHAT_BACKEND_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Backend URL to use: explicit flag, then environment, then this file,
    /// then the built-in default.
    pub fn resolve_backend_url(&self, flag: Option<&str>, env: Option<&str>) -> String {
        [flag, env, self.backend_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BACKEND_URL)
            .to_string()
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("nutrichat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            backend_url: Some("http://10.0.0.2:8000".to_string()),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_resolve_precedence() {
        let config = Config {
            backend_url: Some("http://file:8000".to_string()),
        };

        assert_eq!(
            config.resolve_backend_url(Some("http://flag:1"), Some("http://env:2")),
            "http://flag:1"
        );
        assert_eq!(config.resolve_backend_url(None, Some("http://env:2")), "http://env:2");
        assert_eq!(config.resolve_backend_url(None, None), "http://file:8000");
        assert_eq!(Config::new().resolve_backend_url(None, None), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_blank_override_falls_back_to_default() {
        assert_eq!(Config::new().resolve_backend_url(Some("  "), None), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_blank_override_falls_through_to_saved_url() {
        let config = Config {
            backend_url: Some("http://file:8000".to_string()),
        };
        assert_eq!(config.resolve_backend_url(None, Some("")), "http://file:8000");
        assert_eq!(config.resolve_backend_url(Some(" "), Some("")), "http://file:8000");
        assert_eq!(config.resolve_backend_url(Some(""), Some("http://env:2")), "http://env:2");
    }
}
