//! Cache statistics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters kept by a [`CacheStore`](crate::cache::CacheStore)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads answered from the cache
    pub hits: u64,
    /// Reads forwarded to the directory
    pub misses: u64,
    /// Live entry count at the time of the snapshot
    pub entries: usize,
    /// Entries dropped because their TTL passed
    pub expirations: u64,
    /// Entries dropped by write invalidation or explicit clears
    pub invalidations: u64,
    /// Entries dropped to respect `max_entries`
    pub evictions: u64,
}

impl CacheStats {
    /// Total reads seen by the cache
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Share of reads answered from the cache, in percent
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 * 100.0 / lookups as f64,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {}/{} hits ({:.1}%), {} expired, {} invalidated, {} evicted",
            self.entries,
            self.hits,
            self.lookups(),
            self.hit_rate(),
            self.expirations,
            self.invalidations,
            self.evictions
        )
    }
}
