//! Service configuration
//!
//! Settings are read from a JSON file (the `Performance`/`Resilience` part of
//! the application settings) and can be overridden by environment variables,
//! including ones defined in a `.env` file.

use crate::cache::CacheConfig;
use crate::error::{DirectoryError, ErrorKind, Result};
use crate::resilience::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const ENV_CACHE_TTL_SECONDS: &str = "DIRECTORY_CACHE_TTL_SECONDS";
pub const ENV_NEGATIVE_CACHE_TTL_SECONDS: &str = "DIRECTORY_NEGATIVE_CACHE_TTL_SECONDS";
pub const ENV_CACHE_MAX_ENTRIES: &str = "DIRECTORY_CACHE_MAX_ENTRIES";
pub const ENV_ENABLE_CACHING: &str = "DIRECTORY_ENABLE_CACHING";
pub const ENV_MAX_RETRY_ATTEMPTS: &str = "DIRECTORY_MAX_RETRY_ATTEMPTS";
pub const ENV_RETRY_BACKOFF_BASE_SECONDS: &str = "DIRECTORY_RETRY_BACKOFF_BASE_SECONDS";
pub const ENV_RETRY_MAX_BACKOFF_SECONDS: &str = "DIRECTORY_RETRY_MAX_BACKOFF_SECONDS";
pub const ENV_RETRY_JITTER: &str = "DIRECTORY_RETRY_JITTER";
pub const ENV_RETRYABLE_ERROR_KINDS: &str = "DIRECTORY_RETRYABLE_ERROR_KINDS";

/// Options recognized by the caching and retry layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Lifetime of cached reads
    pub cache_ttl_seconds: u64,

    /// Lifetime of cached "not found" lookups, 0 disables negative caching
    pub negative_cache_ttl_seconds: u64,

    pub cache_max_entries: usize,

    /// When false, reads always go to the backend
    pub enable_caching: bool,

    /// Total attempts per call, the first one included
    pub max_retry_attempts: u32,

    /// Retry `n` waits `retry_backoff_base_seconds ^ n` seconds
    pub retry_backoff_base_seconds: f64,

    pub retry_max_backoff_seconds: u64,

    /// Proportional jitter on top of each backoff delay (0.0 - 1.0)
    pub retry_jitter: f64,

    pub retryable_error_kinds: Vec<ErrorKind>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 300,
            negative_cache_ttl_seconds: 30,
            cache_max_entries: 10_000,
            enable_caching: true,
            max_retry_attempts: 3,
            retry_backoff_base_seconds: 2.0,
            retry_max_backoff_seconds: 60,
            retry_jitter: 0.0,
            retryable_error_kinds: ErrorKind::DEFAULT_TRANSIENT.to_vec(),
        }
    }
}

impl ServiceConfig {
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DirectoryError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        debug!("Loaded service settings from {}", path.display());
        Self::from_json_str(&contents)
    }

    /// Defaults overridden by the process environment and a `.env` file if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides looked up by variable name through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_CACHE_TTL_SECONDS) {
            self.cache_ttl_seconds = parse_var(ENV_CACHE_TTL_SECONDS, &v)?;
        }
        if let Some(v) = lookup(ENV_NEGATIVE_CACHE_TTL_SECONDS) {
            self.negative_cache_ttl_seconds = parse_var(ENV_NEGATIVE_CACHE_TTL_SECONDS, &v)?;
        }
        if let Some(v) = lookup(ENV_CACHE_MAX_ENTRIES) {
            self.cache_max_entries = parse_var(ENV_CACHE_MAX_ENTRIES, &v)?;
        }
        if let Some(v) = lookup(ENV_ENABLE_CACHING) {
            self.enable_caching = parse_var(ENV_ENABLE_CACHING, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_RETRY_ATTEMPTS) {
            self.max_retry_attempts = parse_var(ENV_MAX_RETRY_ATTEMPTS, &v)?;
        }
        if let Some(v) = lookup(ENV_RETRY_BACKOFF_BASE_SECONDS) {
            self.retry_backoff_base_seconds = parse_var(ENV_RETRY_BACKOFF_BASE_SECONDS, &v)?;
        }
        if let Some(v) = lookup(ENV_RETRY_MAX_BACKOFF_SECONDS) {
            self.retry_max_backoff_seconds = parse_var(ENV_RETRY_MAX_BACKOFF_SECONDS, &v)?;
        }
        if let Some(v) = lookup(ENV_RETRY_JITTER) {
            self.retry_jitter = parse_var(ENV_RETRY_JITTER, &v)?;
        }
        if let Some(v) = lookup(ENV_RETRYABLE_ERROR_KINDS) {
            self.retryable_error_kinds = v
                .split(',')
                .filter(|kind| !kind.trim().is_empty())
                .map(str::parse)
                .collect::<Result<Vec<ErrorKind>>>()?;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.cache_config().validate()?;
        self.retry_policy()?;
        Ok(())
    }

    /// Cache settings, or a configuration that retains nothing when caching is off
    pub fn cache_config(&self) -> CacheConfig {
        if !self.enable_caching {
            return CacheConfig {
                max_entries: self.cache_max_entries,
                ..CacheConfig::disabled()
            };
        }

        CacheConfig::builder()
            .ttl(Duration::from_secs(self.cache_ttl_seconds))
            .negative_ttl(Duration::from_secs(self.negative_cache_ttl_seconds))
            .max_entries(self.cache_max_entries)
            .build()
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::builder()
            .max_attempts(self.max_retry_attempts)
            .backoff_base_seconds(self.retry_backoff_base_seconds)
            .max_backoff(Duration::from_secs(self.retry_max_backoff_seconds))
            .jitter(self.retry_jitter)
            .retryable_kinds(self.retryable_error_kinds.iter().copied())
            .build()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        DirectoryError::Config(format!("invalid value '{}' for {}", value, name))
    })
}

/// Builder for [`ServiceConfig`]
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl_seconds = ttl.as_secs();
        self
    }

    pub fn negative_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.negative_cache_ttl_seconds = ttl.as_secs();
        self
    }

    pub fn cache_max_entries(mut self, max: usize) -> Self {
        self.config.cache_max_entries = max;
        self
    }

    pub fn enable_caching(mut self, enable: bool) -> Self {
        self.config.enable_caching = enable;
        self
    }

    pub fn max_retry_attempts(mut self, attempts: u32) -> Self {
        self.config.max_retry_attempts = attempts;
        self
    }

    pub fn retry_backoff_base_seconds(mut self, base: f64) -> Self {
        self.config.retry_backoff_base_seconds = base;
        self
    }

    pub fn retry_max_backoff(mut self, max: Duration) -> Self {
        self.config.retry_max_backoff_seconds = max.as_secs();
        self
    }

    pub fn retry_jitter(mut self, jitter: f64) -> Self {
        self.config.retry_jitter = jitter;
        self
    }

    pub fn retryable_error_kinds(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.config.retryable_error_kinds = kinds.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<ServiceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
