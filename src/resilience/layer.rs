//! Retry decorator for directory operations

use crate::error::Result;
use crate::operations::{Credentials, DirectoryOperations};
use crate::resilience::{executor::execute_with_retry, policy::RetryPolicy};
use crate::schema::{DirectoryGroup, DirectoryUser, DomainStats};
use async_trait::async_trait;
use tracing::info;

/// Retries transient failures of the wrapped client with exponential backoff.
///
/// Every operation, read or write, goes through [`execute_with_retry`] under
/// one immutable [`RetryPolicy`]. The layer keeps no other state and never
/// looks at what the inner layer caches.
///
/// Writes are retried like reads. If the backend applied a write before the
/// transient error reached us, the retry may duplicate its effect or fail with
/// `AlreadyExists`. Use [`RetryPolicy::no_retry`] or idempotent backend writes
/// where that matters.
pub struct ResilientLayer<D> {
    inner: D,
    policy: RetryPolicy,
}

impl<D: DirectoryOperations> ResilientLayer<D> {
    /// Wrap `inner` with the default policy: 3 attempts, 2s/4s backoff,
    /// connection, timeout and transport errors retried
    pub fn new(inner: D) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: D, policy: RetryPolicy) -> Self {
        info!(
            "Initializing retry layer (max attempts: {}, backoff base: {}s)",
            policy.max_attempts(),
            policy.backoff_base_seconds()
        );
        Self { inner, policy }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

#[async_trait]
impl<D: DirectoryOperations> DirectoryOperations for ResilientLayer<D> {
    async fn connection_test(&self, domain: &str, username: &str, password: &str) -> Result<bool> {
        execute_with_retry(&self.policy, "connection_test", || {
            self.inner.connection_test(domain, username, password)
        })
        .await
    }

    /// Configuration only, never retried
    async fn set_credentials(&self, credentials: Credentials) {
        self.inner.set_credentials(credentials).await
    }

    async fn list_users(&self, search_term: &str) -> Result<Vec<DirectoryUser>> {
        execute_with_retry(&self.policy, "list_users", || {
            self.inner.list_users(search_term)
        })
        .await
    }

    async fn get_user(&self, account_id: &str) -> Result<Option<DirectoryUser>> {
        execute_with_retry(&self.policy, "get_user", || self.inner.get_user(account_id)).await
    }

    async fn create_user(&self, user: &DirectoryUser, password: &str) -> Result<bool> {
        execute_with_retry(&self.policy, "create_user", || {
            self.inner.create_user(user, password)
        })
        .await
    }

    async fn update_user(&self, user: &DirectoryUser) -> Result<bool> {
        execute_with_retry(&self.policy, "update_user", || self.inner.update_user(user)).await
    }

    async fn delete_user(&self, account_id: &str) -> Result<bool> {
        execute_with_retry(&self.policy, "delete_user", || {
            self.inner.delete_user(account_id)
        })
        .await
    }

    async fn enable_user(&self, account_id: &str) -> Result<bool> {
        execute_with_retry(&self.policy, "enable_user", || {
            self.inner.enable_user(account_id)
        })
        .await
    }

    async fn disable_user(&self, account_id: &str) -> Result<bool> {
        execute_with_retry(&self.policy, "disable_user", || {
            self.inner.disable_user(account_id)
        })
        .await
    }

    async fn reset_password(
        &self,
        account_id: &str,
        new_password: &str,
        must_change: bool,
    ) -> Result<bool> {
        execute_with_retry(&self.policy, "reset_password", || {
            self.inner
                .reset_password(account_id, new_password, must_change)
        })
        .await
    }

    async fn unlock_account(&self, account_id: &str) -> Result<bool> {
        execute_with_retry(&self.policy, "unlock_account", || {
            self.inner.unlock_account(account_id)
        })
        .await
    }

    async fn list_groups(&self, search_term: &str) -> Result<Vec<DirectoryGroup>> {
        execute_with_retry(&self.policy, "list_groups", || {
            self.inner.list_groups(search_term)
        })
        .await
    }

    async fn get_group(&self, name: &str) -> Result<Option<DirectoryGroup>> {
        execute_with_retry(&self.policy, "get_group", || self.inner.get_group(name)).await
    }

    async fn create_group(&self, group: &DirectoryGroup) -> Result<bool> {
        execute_with_retry(&self.policy, "create_group", || {
            self.inner.create_group(group)
        })
        .await
    }

    async fn delete_group(&self, name: &str) -> Result<bool> {
        execute_with_retry(&self.policy, "delete_group", || self.inner.delete_group(name)).await
    }

    async fn add_user_to_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
        execute_with_retry(&self.policy, "add_user_to_group", || {
            self.inner.add_user_to_group(group_name, account_id)
        })
        .await
    }

    async fn remove_user_from_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
        execute_with_retry(&self.policy, "remove_user_from_group", || {
            self.inner.remove_user_from_group(group_name, account_id)
        })
        .await
    }

    async fn get_domain_stats(&self) -> Result<DomainStats> {
        execute_with_retry(&self.policy, "get_domain_stats", || {
            self.inner.get_domain_stats()
        })
        .await
    }
}
