//! Caching decorator for directory operations

use crate::cache::{
    config::CacheConfig,
    invalidation::{InvalidationReason, InvalidationScope},
    key::CacheKey,
    store::CacheStore,
    types::CacheStats,
};
use crate::error::Result;
use crate::operations::{Credentials, DirectoryOperations};
use crate::schema::{DirectoryGroup, DirectoryUser, DomainStats};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// A read result as held in the cache
#[derive(Debug, Clone)]
pub enum CachedValue {
    Users(Vec<DirectoryUser>),
    User(Option<DirectoryUser>),
    Groups(Vec<DirectoryGroup>),
    Group(Option<DirectoryGroup>),
    Stats(DomainStats),
}

/// Conversion between a read result and its cached form
trait Cacheable: Clone + Sized {
    fn into_cached(self) -> CachedValue;

    fn from_cached(value: CachedValue) -> Option<Self>;

    /// Negative results ("not found") are kept for the shorter negative TTL
    fn is_negative(&self) -> bool {
        false
    }
}

impl Cacheable for Vec<DirectoryUser> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Users(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::Users(users) => Some(users),
            _ => None,
        }
    }
}

impl Cacheable for Option<DirectoryUser> {
    fn into_cached(self) -> CachedValue {
        CachedValue::User(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::User(user) => Some(user),
            _ => None,
        }
    }

    fn is_negative(&self) -> bool {
        self.is_none()
    }
}

impl Cacheable for Vec<DirectoryGroup> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Groups(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::Groups(groups) => Some(groups),
            _ => None,
        }
    }
}

impl Cacheable for Option<DirectoryGroup> {
    fn into_cached(self) -> CachedValue {
        CachedValue::Group(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::Group(group) => Some(group),
            _ => None,
        }
    }

    fn is_negative(&self) -> bool {
        self.is_none()
    }
}

impl Cacheable for DomainStats {
    fn into_cached(self) -> CachedValue {
        CachedValue::Stats(self)
    }

    fn from_cached(value: CachedValue) -> Option<Self> {
        match value {
            CachedValue::Stats(stats) => Some(stats),
            _ => None,
        }
    }
}

/// Serves reads from a time-bounded in-memory cache and purges affected
/// entries after successful writes.
///
/// The layer never changes the outcome of a call: errors from the inner
/// client pass through untouched and are never cached, and a write that
/// returns `Ok(false)` leaves the cache as it was.
pub struct CachingLayer<D> {
    inner: D,
    store: CacheStore<CachedValue>,
    config: CacheConfig,
}

impl<D: DirectoryOperations> CachingLayer<D> {
    /// Wrap `inner` with the default cache configuration (5 minute TTL)
    pub fn new(inner: D) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    pub fn with_config(inner: D, config: CacheConfig) -> Self {
        info!(
            "Initializing directory cache (ttl: {:?}, negative ttl: {:?}, max entries: {})",
            config.ttl, config.negative_ttl, config.max_entries
        );

        Self {
            inner,
            store: CacheStore::new(config.max_entries),
            config,
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.stats().await
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }

    /// Whether a live entry exists for `key`
    pub async fn is_cached(&self, key: &CacheKey) -> bool {
        self.store.contains_key(key).await
    }

    /// Drop every cached entry
    pub async fn invalidate_all(&self) -> usize {
        self.store.clear().await
    }

    /// Drop expired entries immediately
    pub async fn purge_expired(&self) -> usize {
        self.store.purge_expired().await
    }

    fn ttl_for<T: Cacheable>(&self, value: &T) -> Duration {
        if value.is_negative() {
            self.config.negative_ttl
        } else {
            self.config.ttl
        }
    }

    /// Return the cached value for `key`, or await `fetch` and cache its result
    async fn read_through<T, F>(&self, key: CacheKey, fetch: F) -> Result<T>
    where
        T: Cacheable,
        F: Future<Output = Result<T>>,
    {
        if let Some(value) = self.store.get(&key).await.and_then(T::from_cached) {
            debug!("Cache hit: {}", key);
            return Ok(value);
        }

        debug!("Cache miss: {}", key);
        let value = fetch.await?;

        let ttl = self.ttl_for(&value);
        self.store.insert(key, value.clone().into_cached(), ttl).await;

        Ok(value)
    }

    /// Await `write` and invalidate `scope` if the backend applied it
    async fn write_through<F>(&self, scope: InvalidationScope, write: F) -> Result<bool>
    where
        F: Future<Output = Result<bool>>,
    {
        let applied = write.await?;

        if applied {
            self.store.invalidate(&scope).await;
        } else {
            debug!("Write not applied, cache left intact ({})", scope.reason);
        }

        Ok(applied)
    }
}

#[async_trait]
impl<D: DirectoryOperations> DirectoryOperations for CachingLayer<D> {
    async fn connection_test(&self, domain: &str, username: &str, password: &str) -> Result<bool> {
        self.inner.connection_test(domain, username, password).await
    }

    async fn set_credentials(&self, credentials: Credentials) {
        let cleared = self
            .store
            .invalidate(&InvalidationScope::all(InvalidationReason::CredentialsChanged))
            .await;
        info!(
            "Invalidated {} cache entries due to credential change (domain: {})",
            cleared, credentials.domain
        );

        self.inner.set_credentials(credentials).await
    }

    async fn list_users(&self, search_term: &str) -> Result<Vec<DirectoryUser>> {
        self.read_through(
            CacheKey::user_list(search_term),
            self.inner.list_users(search_term),
        )
        .await
    }

    async fn get_user(&self, account_id: &str) -> Result<Option<DirectoryUser>> {
        self.read_through(CacheKey::user(account_id), self.inner.get_user(account_id))
            .await
    }

    async fn create_user(&self, user: &DirectoryUser, password: &str) -> Result<bool> {
        self.write_through(
            InvalidationScope::user(&user.account_name),
            self.inner.create_user(user, password),
        )
        .await
    }

    async fn update_user(&self, user: &DirectoryUser) -> Result<bool> {
        self.write_through(
            InvalidationScope::user(&user.account_name),
            self.inner.update_user(user),
        )
        .await
    }

    async fn delete_user(&self, account_id: &str) -> Result<bool> {
        self.write_through(
            InvalidationScope::user(account_id),
            self.inner.delete_user(account_id),
        )
        .await
    }

    async fn enable_user(&self, account_id: &str) -> Result<bool> {
        self.write_through(
            InvalidationScope::user(account_id),
            self.inner.enable_user(account_id),
        )
        .await
    }

    async fn disable_user(&self, account_id: &str) -> Result<bool> {
        self.write_through(
            InvalidationScope::user(account_id),
            self.inner.disable_user(account_id),
        )
        .await
    }

    async fn reset_password(
        &self,
        account_id: &str,
        new_password: &str,
        must_change: bool,
    ) -> Result<bool> {
        self.write_through(
            InvalidationScope::user(account_id),
            self.inner
                .reset_password(account_id, new_password, must_change),
        )
        .await
    }

    async fn unlock_account(&self, account_id: &str) -> Result<bool> {
        self.write_through(
            InvalidationScope::user(account_id),
            self.inner.unlock_account(account_id),
        )
        .await
    }

    async fn list_groups(&self, search_term: &str) -> Result<Vec<DirectoryGroup>> {
        self.read_through(
            CacheKey::group_list(search_term),
            self.inner.list_groups(search_term),
        )
        .await
    }

    async fn get_group(&self, name: &str) -> Result<Option<DirectoryGroup>> {
        self.read_through(CacheKey::group(name), self.inner.get_group(name))
            .await
    }

    async fn create_group(&self, group: &DirectoryGroup) -> Result<bool> {
        self.write_through(
            InvalidationScope::group(&group.account_name),
            self.inner.create_group(group),
        )
        .await
    }

    async fn delete_group(&self, name: &str) -> Result<bool> {
        self.write_through(
            InvalidationScope::group_removed(name),
            self.inner.delete_group(name),
        )
        .await
    }

    async fn add_user_to_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
        self.write_through(
            InvalidationScope::membership(group_name, account_id),
            self.inner.add_user_to_group(group_name, account_id),
        )
        .await
    }

    async fn remove_user_from_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
        self.write_through(
            InvalidationScope::membership(group_name, account_id),
            self.inner.remove_user_from_group(group_name, account_id),
        )
        .await
    }

    async fn get_domain_stats(&self) -> Result<DomainStats> {
        self.read_through(CacheKey::domain_stats(), self.inner.get_domain_stats())
            .await
    }
}
