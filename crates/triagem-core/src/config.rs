//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/triagem/config.toml)
//! 3. Environment variables (TRIAGEM_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "TRIAGEM";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the backend project (REST + auth live under it)
    #[serde(default)]
    pub base_url: String,

    /// Project API key (sent as `apikey` and as the anonymous bearer)
    #[serde(default)]
    pub api_key: String,

    /// Remote table holding the applications
    #[serde(default = "default_table")]
    pub table: String,

    /// Realtime websocket URL; derived from `base_url` when unset
    #[serde(default)]
    pub realtime_url: Option<String>,

    /// Directory for local state (persisted session)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            table: default_table(),
            realtime_url: None,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TRIAGEM_BASE_URL, TRIAGEM_API_KEY, ...)
    /// 2. Config file (~/.config/triagem/config.toml or TRIAGEM_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Websocket URL for the change feed
    ///
    /// Falls back to the websocket form of `base_url` when not set
    /// explicitly; empty when neither is configured.
    pub fn realtime_url(&self) -> String {
        if let Some(ref url) = self.realtime_url {
            return url.clone();
        }
        if self.base_url.is_empty() {
            return String::new();
        }
        let ws_base = self
            .base_url
            .trim_end_matches('/')
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{}/realtime/v1/websocket", ws_base)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_BASE_URL", ENV_PREFIX)) {
            self.base_url = val;
        }

        if let Ok(val) = std::env::var(format!("{}_API_KEY", ENV_PREFIX)) {
            self.api_key = val;
        }

        if let Ok(val) = std::env::var(format!("{}_TABLE", ENV_PREFIX)) {
            if !val.is_empty() {
                self.table = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_REALTIME_URL", ENV_PREFIX)) {
            self.realtime_url = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Path to the config file
    ///
    /// Honors TRIAGEM_CONFIG when set.
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("triagem")
            .join("config.toml")
    }

    /// Path to the persisted session file
    pub fn session_file_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

fn default_table() -> String {
    "applications".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("triagem")
}
