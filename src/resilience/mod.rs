//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the directory:
//!     -> ResilientLayer (one execute_with_retry per call)
//!     -> inner layer call
//!     -> on a retryable error: sleep backoff(n), call again
//! ```
//!
//! Only the error kinds named by the [`RetryPolicy`] are retried. Validation,
//! not-found, permission and duplicate errors surface on first occurrence.

pub mod executor;
pub mod layer;
pub mod policy;

pub use executor::execute_with_retry;
pub use layer::ResilientLayer;
pub use policy::{RetryPolicy, RetryPolicyBuilder, MAX_BACKOFF_LIMIT};
