use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::Units;

/// Environment variable that overrides `gateway_url` after loading.
pub const GATEWAY_URL_ENV: &str = "WEATHER_GATEWAY_URL";

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000/api";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// gateway_url = "http://localhost:8000/api"
/// default_units = "imperial"
/// request_timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the weather proxy exposing `/search`, `/weather` and `/forecast`.
    pub gateway_url: String,

    pub default_units: Units,

    /// Applied to every gateway call; expiry surfaces as a transport error.
    pub request_timeout_secs: u64,

    /// Quiet period after the last keystroke before city search runs.
    pub debounce_ms: u64,

    /// Shorter input clears suggestions instead of searching.
    pub min_query_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            default_units: Units::Metric,
            request_timeout_secs: 10,
            debounce_ms: 300,
            min_query_len: 2,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    /// The gateway URL environment override is applied afterwards.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(GATEWAY_URL_ENV) {
            cfg.apply_gateway_override(&url);
        }

        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.gateway_url.trim().is_empty() {
            return Err(anyhow!("gateway_url must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    fn apply_gateway_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.gateway_url = url.trim_end_matches('/').to_string();
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
