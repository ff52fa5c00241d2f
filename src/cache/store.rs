//! In-memory cache store with lazy TTL expiration

use crate::cache::{
    entry::CacheEntry,
    invalidation::InvalidationScope,
    key::CacheKey,
    types::CacheStats,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

/// Thread-safe cache storage shared by one caching layer.
///
/// Expired entries are dropped when they are read. No background sweep runs.
pub struct CacheStore<V> {
    max_entries: usize,
    inner: Arc<RwLock<StoreInner<V>>>,
}

struct StoreInner<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
    stats: CacheStats,
}

impl<V: Clone> CacheStore<V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            inner: Arc::new(RwLock::new(StoreInner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            })),
        }
    }

    /// Get a live value, recording a hit or a miss
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let mut guard = self.inner.write().await;
        let store = &mut *guard;

        let expired = match store.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                store.stats.hits += 1;
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!("Cache entry expired: {}", key);
            store.entries.remove(key);
            store.stats.expirations += 1;
            store.stats.entries = store.entries.len();
        }

        store.stats.misses += 1;
        None
    }

    /// Store `value` under `key` for `ttl`. A zero TTL stores nothing.
    pub async fn insert(&self, key: CacheKey, value: V, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }

        let mut store = self.inner.write().await;

        if !store.entries.contains_key(&key) && store.entries.len() >= self.max_entries {
            Self::evict_one(&mut store);
        }

        store.entries.insert(key.clone(), CacheEntry::new(key, value, ttl));
        store.stats.entries = store.entries.len();
    }

    /// Remove every entry inside `scope`, returning how many were dropped
    pub async fn invalidate(&self, scope: &InvalidationScope) -> usize {
        let mut store = self.inner.write().await;
        let before = store.entries.len();

        store.entries.retain(|key, _| !scope.covers(key));

        let removed = before - store.entries.len();
        store.stats.invalidations += removed as u64;
        store.stats.entries = store.entries.len();

        debug!("Invalidated {} entries ({})", removed, scope.reason);
        removed
    }

    /// Clear all entries from the cache
    pub async fn clear(&self) -> usize {
        let mut store = self.inner.write().await;

        let count = store.entries.len();
        store.entries.clear();
        store.stats.entries = 0;
        store.stats.invalidations += count as u64;

        info!("Cleared {} entries from cache", count);
        count
    }

    /// Drop every expired entry now instead of waiting for it to be read
    pub async fn purge_expired(&self) -> usize {
        let mut store = self.inner.write().await;
        let now = Instant::now();
        let before = store.entries.len();

        store.entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - store.entries.len();
        store.stats.expirations += removed as u64;
        store.stats.entries = store.entries.len();

        if removed > 0 {
            debug!("Purged {} expired entries", removed);
        }
        removed
    }

    pub async fn contains_key(&self, key: &CacheKey) -> bool {
        let store = self.inner.read().await;
        store
            .entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.inner.read().await;
        store.stats.clone()
    }

    /// Number of stored entries, including expired ones not yet read
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Make room for one entry: an expired entry if any, otherwise the one
    /// closest to expiry.
    fn evict_one(store: &mut StoreInner<V>) {
        let now = Instant::now();
        let victim = store
            .entries
            .values()
            .find(|entry| entry.is_expired_at(now))
            .or_else(|| store.entries.values().min_by_key(|entry| entry.expires_at))
            .map(|entry| entry.key.clone());

        if let Some(key) = victim {
            debug!("Evicting entry due to max_entries limit: {}", key);
            store.entries.remove(&key);
            store.stats.evictions += 1;
        }
    }
}
