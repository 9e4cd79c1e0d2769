//! Configuration management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Search backend settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
        }
    }
}

/// Search backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the search backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connect timeout in seconds (the stream itself carries no timeout)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Connect timeout as a duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_base_url() -> String {
    std::env::var("UNINAVI_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn default_connect_timeout() -> u64 {
    std::env::var("UNINAVI_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(10)
}

fn default_user_agent() -> String {
    std::env::var("UNINAVI_USER_AGENT")
        .unwrap_or_else(|_| concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string())
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load configuration from a TOML file, falling back to defaults when no
/// file is given and none is found in the usual locations.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path.map(Path::to_path_buf).or_else(find_config_file) {
        Some(path) => path,
        None => return Ok(Config::default()),
    };

    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
}

/// Look for `uninavi-search.toml` in the working directory, then
/// `config.toml` under the user config directory.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("uninavi-search.toml");
    if local.is_file() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("uninavi-search").join("config.toml");
    user.is_file().then_some(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::default();
        assert!(!config.api.base_url.is_empty());
        assert_eq!(config.api.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://api.uninavi.example"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.uninavi.example");
        assert_eq!(config.api.connect_timeout_secs, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/uninavi.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
