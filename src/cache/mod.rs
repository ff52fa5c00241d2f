//! # Directory Caching Layer
//!
//! Memoizes directory reads for a bounded time window and keeps the cache
//! consistent with writes.
//!
//! ## Features
//!
//! - **TTL-Based Expiration**: entries expire lazily when read, default 5 minutes
//! - **Negative Caching**: "not found" lookups are cached for a shorter TTL
//! - **Coarse Invalidation**: a successful write drops the affected entities,
//!   every list result of the affected types and the domain statistics
//! - **Credential Isolation**: changing credentials clears the whole cache
//!
//! ## Example
//!
//! ```rust
//! use directory_resilience::cache::{CacheConfig, CachingLayer};
//! use directory_resilience::{DirectoryOperations, DirectoryUser, InMemoryDirectory};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let directory = InMemoryDirectory::with_domain("corp.example");
//! directory.insert_user(DirectoryUser::new("jdoe", "John Doe")).await;
//!
//! let config = CacheConfig::builder()
//!     .ttl(Duration::from_secs(120))
//!     .build();
//! let cached = CachingLayer::with_config(directory, config);
//!
//! let first = cached.list_users("jdoe").await?;
//! let second = cached.list_users("jdoe").await?; // served from cache
//! assert_eq!(first, second);
//! assert_eq!(cached.stats().await.hits, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod invalidation;
pub mod key;
pub mod layer;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder, MAX_TTL};
pub use entry::CacheEntry;
pub use invalidation::{InvalidationReason, InvalidationScope};
pub use key::{CacheKey, CacheKeyBuilder, KeyNamespace};
pub use layer::{CachedValue, CachingLayer};
pub use store::CacheStore;
pub use types::CacheStats;
