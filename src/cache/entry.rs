//! Cache entry management with TTL support

use crate::cache::config::MAX_TTL;
use crate::cache::key::CacheKey;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value and its expiry.
///
/// Times come from the tokio clock so a paused runtime controls expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: CacheKey,
    pub value: V,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Create an entry that expires `ttl` from now, at most [`MAX_TTL`]
    pub fn new(key: CacheKey, value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        let ttl = ttl.min(MAX_TTL);
        Self {
            key,
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// An entry is live strictly before its expiry instant
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Get time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Instant::now();
        if self.is_expired_at(now) {
            None
        } else {
            Some(self.expires_at - now)
        }
    }

    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.created_at)
    }
}
