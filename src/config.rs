use crate::constants;
use crate::error::{LineupError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "lineup.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub paging: PagingConfig,
    pub discover: DiscoverConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Upper bound on outgoing requests; 0 disables pacing
    pub requests_per_second: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_API_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 15,
            requests_per_second: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PagingConfig {
    pub discover_page_size: u32,
    pub list_page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            discover_page_size: constants::DISCOVER_PAGE_SIZE,
            list_page_size: constants::EVENT_LIST_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscoverConfig {
    /// Pause between the discover category requests
    pub request_delay_ms: u64,
    pub near_you_radius: String,
}

impl Default for DiscoverConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 500,
            near_you_radius: constants::EVENTS_NEAR_YOU_RADIUS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data").join("lineup.sqlite"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (or `lineup.toml` when absent), then apply
    /// `.env` and environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a TOML file; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("LINEUP_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.api.api_key = key;
        }
        if let Some(url) = lookup("LINEUP_API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(db) = lookup("LINEUP_DB_PATH").filter(|v| !v.trim().is_empty()) {
            self.storage.database_path = PathBuf::from(db);
        }
        if let Some(dir) = lookup("LINEUP_LOG_DIR").filter(|v| !v.trim().is_empty()) {
            self.logging.directory = PathBuf::from(dir);
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        let key = self.api.api_key.trim();
        if key.is_empty() {
            return Err(LineupError::Config(
                "missing API key (set api.api_key or LINEUP_API_KEY)".to_string(),
            ));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [api]
            api_key = "abc"

            [paging]
            list_page_size = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.api.api_key, "abc");
        assert_eq!(config.api.base_url, constants::DEFAULT_API_BASE_URL);
        assert_eq!(config.paging.list_page_size, 50);
        assert_eq!(config.paging.discover_page_size, constants::DISCOVER_PAGE_SIZE);
        assert_eq!(config.discover.request_delay_ms, 500);
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = AppConfig::from_toml("[api\napi_key = ").unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_env_overrides_ignore_blank_values() {
        let env: HashMap<&str, &str> = [
            ("LINEUP_API_KEY", "from-env"),
            ("LINEUP_API_BASE_URL", "  "),
            ("LINEUP_DB_PATH", "/tmp/lineup.db"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.api_key, "from-env");
        assert_eq!(config.api.base_url, constants::DEFAULT_API_BASE_URL);
        assert_eq!(config.storage.database_path, PathBuf::from("/tmp/lineup.db"));
    }

    #[test]
    fn test_require_api_key() {
        let mut config = AppConfig::default();
        assert!(config.require_api_key().is_err());
        config.api.api_key = "k".to_string();
        assert_eq!(config.require_api_key().unwrap(), "k");
    }
}
