//! Retry policy with exponential backoff

use crate::error::{DirectoryError, ErrorKind, Result};
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;

/// Longest wait a policy may place between two attempts
pub const MAX_BACKOFF_LIMIT: Duration = Duration::from_secs(24 * 60 * 60);

/// How often and how patiently transient failures are retried.
///
/// The delay before retry `n` (counted from 1) is `backoff_base_seconds^n`
/// seconds, capped at `max_backoff`. With the defaults (base 2, 3 attempts)
/// a failing call is tried at t=0, t=2s and t=6s.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base_seconds: f64,
    max_backoff: Duration,
    jitter: f64,
    retryable: HashSet<ErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_seconds: 2.0,
            max_backoff: Duration::from_secs(60),
            jitter: 0.0,
            retryable: ErrorKind::DEFAULT_TRANSIENT.into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// A policy that makes a single attempt
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Total attempts, the first call included
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff_base_seconds(&self) -> f64 {
        self.backoff_base_seconds
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn retryable_kinds(&self) -> &HashSet<ErrorKind> {
        &self.retryable
    }

    /// Whether `error` is worth another attempt
    pub fn is_retryable(&self, error: &DirectoryError) -> bool {
        self.retryable.contains(&error.kind())
    }

    /// Delay before retrying after failed attempt `attempt` (counted from 1),
    /// without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let secs = self.backoff_base_seconds.powi(exponent);
        let max_secs = self.max_backoff.as_secs_f64();

        if !secs.is_finite() || secs >= max_secs {
            self.max_backoff
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Delay before retrying after failed attempt `attempt`, with jitter applied
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.backoff(attempt);
        if self.jitter == 0.0 || delay.is_zero() {
            return delay;
        }

        let factor = rand::thread_rng().gen_range(0.0..=self.jitter);
        Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 + factor)).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(DirectoryError::Config(
                "max_retry_attempts must be at least 1".to_string(),
            ));
        }

        if !self.backoff_base_seconds.is_finite() || self.backoff_base_seconds <= 0.0 {
            return Err(DirectoryError::Config(format!(
                "retry backoff base must be a positive number of seconds, got {}",
                self.backoff_base_seconds
            )));
        }

        if self.max_backoff > MAX_BACKOFF_LIMIT {
            return Err(DirectoryError::Config(format!(
                "retry max backoff ({:?}) must not exceed {:?}",
                self.max_backoff, MAX_BACKOFF_LIMIT
            )));
        }

        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(DirectoryError::Config(
                "retry jitter must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`RetryPolicy`]
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    max_attempts: Option<u32>,
    backoff_base_seconds: Option<f64>,
    max_backoff: Option<Duration>,
    jitter: Option<f64>,
    retryable: Option<HashSet<ErrorKind>>,
}

impl RetryPolicyBuilder {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn backoff_base_seconds(mut self, base: f64) -> Self {
        self.backoff_base_seconds = Some(base);
        self
    }

    pub fn max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = Some(max);
        self
    }

    /// Proportional jitter (0.0 - 1.0) added on top of each delay
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = Some(jitter);
        self
    }

    /// Replace the set of retryable error kinds
    pub fn retryable_kinds(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retryable = Some(kinds.into_iter().collect());
        self
    }

    /// Build and validate the policy
    pub fn build(self) -> Result<RetryPolicy> {
        let defaults = RetryPolicy::default();

        let policy = RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            backoff_base_seconds: self
                .backoff_base_seconds
                .unwrap_or(defaults.backoff_base_seconds),
            max_backoff: self.max_backoff.unwrap_or(defaults.max_backoff),
            jitter: self.jitter.unwrap_or(defaults.jitter),
            retryable: self.retryable.unwrap_or(defaults.retryable),
        };

        policy.validate()?;
        Ok(policy)
    }
}
