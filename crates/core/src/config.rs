//! Application configuration loaded from disk and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Base URL of the aggregation API baked into the build.
pub const DEFAULT_API_BASE_URL: &str = "https://contests-cyus.onrender.com";
/// Directory under the user's config dir holding `config.toml`.
pub const CONFIG_DIR: &str = "contest-hub";
/// Prefix for environment overrides, e.g. `CONTESTHUB_API_BASE_URL`.
pub const ENV_PREFIX: &str = "CONTESTHUB";

const CONFIG_FILE: &str = "config.toml";

/// Runtime settings for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the contest/hackathon aggregation API.
    pub api_base_url: String,
    /// Path of the contests collection.
    pub contests_path: String,
    /// Path of the hackathons collection. Older deployments serve `/hack`.
    pub hackathons_path: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Platform tokens offered by the category filter, in cycle order.
    pub platforms: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            contests_path: "/contests".to_string(),
            hackathons_path: "/hackathons".to_string(),
            request_timeout_secs: 20,
            platforms: vec![
                "leetcode".to_string(),
                "codeforces".to_string(),
                "codechef".to_string(),
            ],
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `api_base_url` was blank.
    #[error("api_base_url must not be empty")]
    EmptyBaseUrl,
    /// `request_timeout_secs` was zero.
    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

impl AppConfig {
    /// Location of the user config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Load configuration from the default path layered with environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load configuration from `path` (optional on disk) layered with environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("platforms"),
            )
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Join the base URL and a collection path with a single slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Timeout applied to every request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Write the default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(AppConfig::default_path())
}

/// Write the default config to `path` unless the file already exists.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }

    let serialized =
        toml::to_string_pretty(&AppConfig::default()).context("failed to serialize config")?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default config");
    Ok(())
}
