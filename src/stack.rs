//! Composition of the decorator layers

use crate::cache::CachingLayer;
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::operations::DirectoryOperations;
use crate::resilience::ResilientLayer;
use tracing::info;

/// The full decorator chain: retries outside, cache inside.
///
/// A cache hit returns before the retry loop ever waits. A miss whose backend
/// call fails transiently is retried, and each retry consults the cache again.
pub type DirectoryStack<D> = ResilientLayer<CachingLayer<D>>;

impl<D: DirectoryOperations> ResilientLayer<CachingLayer<D>> {
    /// Wrap `client` in a caching layer and a retry layer configured by `config`
    pub fn build(client: D, config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let policy = config.retry_policy()?;
        let cache = CachingLayer::with_config(client, config.cache_config());

        info!(
            "Directory stack ready (caching: {}, retry attempts: {})",
            config.enable_caching,
            policy.max_attempts()
        );

        Ok(ResilientLayer::with_policy(cache, policy))
    }

    /// The caching layer, for statistics and manual invalidation
    pub fn cache(&self) -> &CachingLayer<D> {
        self.inner()
    }

    /// The undecorated client
    pub fn client(&self) -> &D {
        self.inner().inner()
    }
}
