//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (DOCENT_*)
//! 2. TOML config file (if DOCENT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Which [`CacheStore`](crate::cache::CacheStore) implementation backs the search cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process map, lost on restart.
    #[default]
    Memory,
    /// SQLite file at `db_path`.
    Sqlite,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (DOCENT_*)
/// 2. TOML config file (if DOCENT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Weaviate instance.
    ///
    /// Set via DOCENT_WEAVIATE_URL environment variable.
    #[serde(default = "default_weaviate_url")]
    pub weaviate_url: String,

    /// Weaviate API key, sent as a bearer token when present.
    #[serde(default)]
    pub weaviate_api_key: Option<String>,

    /// OpenAI key forwarded to Weaviate for `nearText` vectorisation.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Base URL of the crawler service API.
    ///
    /// Set via DOCENT_CRAWLER_API_URL environment variable.
    #[serde(default = "default_crawler_api_url")]
    pub crawler_api_url: String,

    /// Cache store implementation: "memory" or "sqlite".
    #[serde(default)]
    pub cache_backend: CacheBackend,

    /// Path to SQLite cache database (sqlite backend only).
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Time-to-live for cached search results and documents.
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// How often expired cache entries are swept.
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub cache_sweep_interval_secs: u64,

    /// Number of performance samples retained.
    #[serde(default = "default_metrics_capacity")]
    pub metrics_capacity: usize,

    /// Crawl status polling interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upstream request timeout in milliseconds.
    ///
    /// Set via DOCENT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_weaviate_url() -> String {
    "http://localhost:8080".into()
}

fn default_crawler_api_url() -> String {
    "http://crawler:3000/api/v1".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./docent-cache.sqlite")
}

fn default_cache_ttl_seconds() -> u64 {
    300
}

fn default_cache_sweep_interval_secs() -> u64 {
    60
}

fn default_metrics_capacity() -> usize {
    1000
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_user_agent() -> String {
    "docent/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            weaviate_url: default_weaviate_url(),
            weaviate_api_key: None,
            openai_api_key: None,
            crawler_api_url: default_crawler_api_url(),
            cache_backend: CacheBackend::Memory,
            db_path: default_db_path(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            cache_sweep_interval_secs: default_cache_sweep_interval_secs(),
            metrics_capacity: default_metrics_capacity(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `DOCENT_`
    /// 2. TOML file from `DOCENT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("DOCENT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("DOCENT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
