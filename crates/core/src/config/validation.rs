//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, CacheBackend};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `weaviate_url` or `crawler_api_url` is not an http(s) URL
    /// - `cache_ttl_seconds`, `cache_sweep_interval_secs` or `metrics_capacity` is 0
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `poll_interval_ms` is less than 100ms
    /// - `user_agent` is empty
    ///
    /// Returns `ConfigError::Missing` if the sqlite backend is selected without a `db_path`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.weaviate_url) {
            return Err(ConfigError::Invalid {
                field: "weaviate_url".into(),
                reason: "must start with http:// or https://".into(),
            });
        }
        if !is_http_url(&self.crawler_api_url) {
            return Err(ConfigError::Invalid {
                field: "crawler_api_url".into(),
                reason: "must start with http:// or https://".into(),
            });
        }

        if self.cache_ttl_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_seconds".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.cache_sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_sweep_interval_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.cache_backend == CacheBackend::Sqlite && self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing {
                field: "db_path".into(),
                hint: "Set DOCENT_DB_PATH when DOCENT_CACHE_BACKEND=sqlite".into(),
            });
        }

        if self.metrics_capacity == 0 {
            return Err(ConfigError::Invalid { field: "metrics_capacity".into(), reason: "must be greater than 0".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.poll_interval_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.cache_sweep_interval_secs > self.cache_ttl_seconds {
            tracing::warn!(
                sweep_interval_secs = self.cache_sweep_interval_secs,
                ttl_seconds = self.cache_ttl_seconds,
                "cache sweep interval is longer than the TTL; expired entries linger until read"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_non_http_weaviate_url() {
        let config = AppConfig { weaviate_url: "localhost:8080".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "weaviate_url"));
    }

    #[test]
    fn test_validate_non_http_crawler_url() {
        let config = AppConfig { crawler_api_url: "grpc://crawler".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "crawler_api_url"));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let config = AppConfig { cache_ttl_seconds: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_seconds"));
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = AppConfig { metrics_capacity: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "metrics_capacity"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_poll_interval_too_small() {
        let config = AppConfig { poll_interval_ms: 10, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "poll_interval_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_sqlite_without_path() {
        let config = AppConfig { cache_backend: CacheBackend::Sqlite, db_path: PathBuf::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "db_path"));
    }
}
