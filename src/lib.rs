//! # directory-resilience
//!
//! Caching and retry decorators for directory service clients (users,
//! groups, memberships, domain statistics).
//!
//! ## Features
//!
//! - One async contract, [`DirectoryOperations`], implemented by the raw
//!   client and by every decorator, so layers compose freely
//! - Read-through cache with TTL expiry, negative caching and coarse
//!   invalidation on successful writes
//! - Exponential backoff retries for transient failures
//! - Configuration from JSON files and `DIRECTORY_*` environment variables
//!
//! ## Layering
//!
//! ```text
//! ResilientLayer -> CachingLayer -> DirectoryClient
//! ```
//!
//! The retry layer sits outside, so a cache hit never waits on a backoff and
//! a cache miss that fails transiently is retried.
//!
//! ```no_run
//! use directory_resilience::{
//!     Credentials, DirectoryOperations, DirectoryStack, InMemoryDirectory, ServiceConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServiceConfig::from_env()?;
//!     let directory = DirectoryStack::build(InMemoryDirectory::new(), &config)?;
//!
//!     directory
//!         .set_credentials(Credentials::new("corp.example", "CORP\\admin", "secret"))
//!         .await;
//!
//!     let users = directory.list_users("").await?;
//!     println!("{} users", users.len());
//!     println!("{}", directory.cache().stats().await);
//!     Ok(())
//! }
//! ```
//!
//! ## Retrying by hand
//!
//! [`execute_with_retry`] runs any fallible async call under a [`RetryPolicy`]:
//!
//! ```no_run
//! use directory_resilience::{execute_with_retry, DirectoryOperations, InMemoryDirectory, RetryPolicy};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let directory = InMemoryDirectory::with_domain("corp.example");
//!     let policy = RetryPolicy::builder().max_attempts(5).build()?;
//!
//!     let stats = execute_with_retry(&policy, "get_domain_stats", || {
//!         directory.get_domain_stats()
//!     })
//!     .await?;
//!     println!("{:.1}% enabled", stats.enabled_percentage());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod memory;
pub mod operations;
pub mod resilience;
pub mod schema;
pub mod stack;

// Re-export main types for convenience
pub use cache::{CacheConfig, CacheStats, CachingLayer};
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::{DirectoryError, ErrorKind, Result};
pub use logging::init_logging;
pub use memory::InMemoryDirectory;
pub use operations::{Credentials, DirectoryOperations};
pub use resilience::{execute_with_retry, ResilientLayer, RetryPolicy};
pub use schema::{DirectoryGroup, DirectoryUser, DomainStats, GroupMember, MemberKind};
pub use stack::DirectoryStack;
