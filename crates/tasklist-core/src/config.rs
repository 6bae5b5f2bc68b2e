//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/tasklist/config.toml)
//! 3. Environment variables (TASKLIST_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::UserId;
use crate::remote::DEFAULT_API_URL;

/// Environment variable prefix
const ENV_PREFIX: &str = "TASKLIST";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the todo collection
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Owner of the collection; required for any remote call
    #[serde(default)]
    pub user_id: Option<u64>,

    /// How long notices stay visible
    #[serde(default = "default_notice_timeout_ms")]
    pub notice_timeout_ms: u64,

    /// Per-request timeout for the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory for local files (logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log file for the TUI (defaults to `<data_dir>/debug.log`)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_id: None,
            notice_timeout_ms: default_notice_timeout_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            data_dir: default_data_dir(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TASKLIST_API_URL, TASKLIST_USER_ID, ...)
    /// 2. Config file (~/.config/tasklist/config.toml or TASKLIST_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(val) = env_var("API_URL") {
            self.api_url = val;
        }

        // Empty or 0 clears the owner
        if let Some(val) = env_var("USER_ID") {
            self.user_id = parse_user_id(&val)
                .with_context(|| format!("Invalid {}_USER_ID: {:?}", ENV_PREFIX, val))?;
        }

        if let Some(val) = env_var("NOTICE_TIMEOUT_MS") {
            self.notice_timeout_ms = val.trim().parse().with_context(|| {
                format!("Invalid {}_NOTICE_TIMEOUT_MS: {:?}", ENV_PREFIX, val)
            })?;
        }

        if let Some(val) = env_var("DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }

        Ok(())
    }

    /// Ensure data directory exists
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Set a single key from its string form, as given on the command line
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let cleared = value.is_empty() || value == "none";
        match key {
            "api_url" => {
                self.api_url = if cleared {
                    default_api_url()
                } else {
                    value.trim_end_matches('/').to_string()
                };
            }
            "user_id" => {
                self.user_id = if cleared {
                    None
                } else {
                    parse_user_id(value).context("Invalid value for user_id")?
                };
            }
            "notice_timeout_ms" => {
                self.notice_timeout_ms = value
                    .parse()
                    .context("Invalid value for notice_timeout_ms. Use milliseconds.")?;
            }
            "request_timeout_secs" => {
                self.request_timeout_secs = value
                    .parse()
                    .context("Invalid value for request_timeout_secs. Use seconds.")?;
            }
            "data_dir" => {
                self.data_dir = value.into();
            }
            "log_file" => {
                self.log_file = if cleared { None } else { Some(value.into()) };
            }
            _ => {
                anyhow::bail!(
                    "Unknown configuration key: '{}'\n\
                     Valid keys: {}",
                    key,
                    Self::KEYS.join(", ")
                );
            }
        }
        Ok(())
    }

    /// Keys accepted by [`Config::set`]
    pub const KEYS: [&'static str; 6] = [
        "api_url",
        "user_id",
        "notice_timeout_ms",
        "request_timeout_secs",
        "data_dir",
        "log_file",
    ];

    /// Get the config file path
    ///
    /// Can be overridden with TASKLIST_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Some(path) = env_var("CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tasklist")
            .join("config.toml")
    }

    /// The configured owner
    pub fn user_id(&self) -> Result<UserId, ConfigError> {
        self.user_id.map(UserId).ok_or(ConfigError::MissingUserId)
    }

    pub fn notice_timeout(&self) -> Duration {
        Duration::from_millis(self.notice_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Where the TUI writes its log
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, name)).ok()
}

/// Parse an owner id; empty or `0` means none
fn parse_user_id(value: &str) -> Result<Option<u64>, std::num::ParseIntError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let id: u64 = value.parse()?;
    Ok((id != 0).then_some(id))
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_notice_timeout_ms() -> u64 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasklist")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "TASKLIST_API_URL",
        "TASKLIST_USER_ID",
        "TASKLIST_NOTICE_TIMEOUT_MS",
        "TASKLIST_DATA_DIR",
        "TASKLIST_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://mate.academy/students-api");
        assert!(config.user_id.is_none());
        assert_eq!(config.notice_timeout(), Duration::from_millis(3000));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.data_dir.ends_with("tasklist"));
    }

    #[test]
    fn test_missing_user_id() {
        let config = Config::default();
        assert_eq!(config.user_id(), Err(ConfigError::MissingUserId));

        let config = Config {
            user_id: Some(42),
            ..Config::default()
        };
        assert_eq!(config.user_id(), Ok(UserId(42)));
    }

    #[test]
    fn test_log_path() {
        let mut config = Config {
            data_dir: PathBuf::from("/data/tasklist"),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/data/tasklist/debug.log"));

        config.log_file = Some(PathBuf::from("/tmp/tasklist.log"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/tasklist.log"));
    }

    #[test]
    fn test_env_override_user_id() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKLIST_USER_ID", "42");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.user_id, Some(42));

        // Empty string and zero clear it
        env::set_var("TASKLIST_USER_ID", "");
        config.apply_env_overrides().unwrap();
        assert!(config.user_id.is_none());

        config.user_id = Some(7);
        env::set_var("TASKLIST_USER_ID", "0");
        config.apply_env_overrides().unwrap();
        assert!(config.user_id.is_none());

        env::set_var("TASKLIST_USER_ID", "abc");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_env_override_api_and_timeout() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("TASKLIST_API_URL", "http://localhost:8080");
        env::set_var("TASKLIST_NOTICE_TIMEOUT_MS", "500");
        env::set_var("TASKLIST_DATA_DIR", "/tmp/tasklist-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.notice_timeout(), Duration::from_millis(500));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/tasklist-test"));
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            api_url = "http://example.com/api"
            user_id = 12
            notice_timeout_ms = 1000
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.api_url, "http://example.com/api");
        assert_eq!(config.user_id, Some(12));
        assert_eq!(config.notice_timeout_ms, 1000);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_env_beats_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("TASKLIST_USER_ID", "99");
        let config = Config::load_from_str("user_id = 12").unwrap();
        assert_eq!(config.user_id, Some(99));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("user_id", "5").unwrap();
        config.set("api_url", "http://localhost:3000/").unwrap();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded.user_id, Some(5));
        assert_eq!(loaded.api_url, "http://localhost:3000");
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set("colour", "blue").is_err());
        assert!(config.set("user_id", "-1").is_err());
        assert!(config.set("notice_timeout_ms", "soon").is_err());

        config.set("user_id", "3").unwrap();
        config.set("user_id", "none").unwrap();
        assert!(config.user_id.is_none());
    }

    #[test]
    fn test_config_file_path_override() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("TASKLIST_CONFIG", "/tmp/custom.toml");
        assert_eq!(Config::config_file_path(), PathBuf::from("/tmp/custom.toml"));

        env::remove_var("TASKLIST_CONFIG");
        assert!(Config::config_file_path().ends_with("tasklist/config.toml"));
    }
}
