//! Configuration for the caching layer

use crate::error::{DirectoryError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest lifetime an entry can be given. Longer TTLs are rejected by
/// [`CacheConfig::validate`] and capped when an entry is created.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Configuration for [`CachingLayer`](crate::cache::CachingLayer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a cached read result
    pub ttl: Duration,

    /// Lifetime of a cached "not found" lookup. Zero disables negative caching.
    pub negative_ttl: Duration,

    /// Maximum number of entries held at once
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            // 5 minutes
            ttl: Duration::from_secs(300),
            negative_ttl: Duration::from_secs(30),
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// A configuration that never retains anything. Reads always reach the backend.
    pub fn disabled() -> Self {
        Self {
            ttl: Duration::ZERO,
            negative_ttl: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(DirectoryError::Config(
                "cache max_entries must be greater than 0".to_string(),
            ));
        }

        if self.ttl > MAX_TTL {
            return Err(DirectoryError::Config(format!(
                "cache ttl ({:?}) must not exceed {:?}",
                self.ttl, MAX_TTL
            )));
        }

        if self.negative_ttl > self.ttl {
            return Err(DirectoryError::Config(format!(
                "negative cache ttl ({:?}) must not exceed the cache ttl ({:?})",
                self.negative_ttl, self.ttl
            )));
        }

        Ok(())
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    ttl: Option<Duration>,
    negative_ttl: Option<Duration>,
    max_entries: Option<usize>,
}

impl CacheConfigBuilder {
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn negative_ttl(mut self, ttl: Duration) -> Self {
        self.negative_ttl = Some(ttl);
        self
    }

    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            ttl: self.ttl.unwrap_or(defaults.ttl),
            negative_ttl: self.negative_ttl.unwrap_or(defaults.negative_ttl),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
        }
    }
}
