//! The directory operations contract
//!
//! [`DirectoryOperations`] is implemented by the raw directory client and by
//! every decorator layer, so layers compose freely:
//!
//! ```text
//! ResilientLayer -> CachingLayer -> DirectoryClient
//! ```

use crate::error::Result;
use crate::schema::{DirectoryGroup, DirectoryUser, DomainStats};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Bind credentials for a directory domain
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub domain: String,
    pub username: String,
    pub password: String,
    /// Organizational unit new entities are created under, empty for the domain default
    pub default_ou: String,
}

impl Credentials {
    pub fn new(
        domain: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            username: username.into(),
            password: password.into(),
            default_ou: String::new(),
        }
    }

    pub fn with_default_ou(mut self, ou: impl Into<String>) -> Self {
        self.default_ou = ou.into();
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("default_ou", &self.default_ou)
            .finish()
    }
}

/// Operations offered by a directory backend.
///
/// Write operations return `Ok(true)` when the change was applied and
/// `Ok(false)` when the backend declined it (for example, the target entity
/// does not exist). Lookups return `Ok(None)` for missing entities.
#[async_trait]
pub trait DirectoryOperations: Send + Sync {
    /// Check whether the given credentials can bind to `domain`
    async fn connection_test(&self, domain: &str, username: &str, password: &str)
        -> Result<bool>;

    /// Replace the credentials used for subsequent calls
    async fn set_credentials(&self, credentials: Credentials);

    /// Users whose account name, display name or email contains `search_term`.
    /// An empty term lists every user.
    async fn list_users(&self, search_term: &str) -> Result<Vec<DirectoryUser>>;

    async fn get_user(&self, account_id: &str) -> Result<Option<DirectoryUser>>;

    async fn create_user(&self, user: &DirectoryUser, password: &str) -> Result<bool>;

    async fn update_user(&self, user: &DirectoryUser) -> Result<bool>;

    async fn delete_user(&self, account_id: &str) -> Result<bool>;

    async fn enable_user(&self, account_id: &str) -> Result<bool>;

    async fn disable_user(&self, account_id: &str) -> Result<bool>;

    async fn reset_password(
        &self,
        account_id: &str,
        new_password: &str,
        must_change: bool,
    ) -> Result<bool>;

    async fn unlock_account(&self, account_id: &str) -> Result<bool>;

    /// Groups whose account name, name or description contains `search_term`
    async fn list_groups(&self, search_term: &str) -> Result<Vec<DirectoryGroup>>;

    async fn get_group(&self, name: &str) -> Result<Option<DirectoryGroup>>;

    async fn create_group(&self, group: &DirectoryGroup) -> Result<bool>;

    async fn delete_group(&self, name: &str) -> Result<bool>;

    async fn add_user_to_group(&self, group_name: &str, account_id: &str) -> Result<bool>;

    async fn remove_user_from_group(&self, group_name: &str, account_id: &str) -> Result<bool>;

    async fn get_domain_stats(&self) -> Result<DomainStats>;
}

macro_rules! forward_directory_operations {
    ($($wrapper:ty),+) => {$(
        #[async_trait]
        impl<T: DirectoryOperations + ?Sized> DirectoryOperations for $wrapper {
            async fn connection_test(&self, domain: &str, username: &str, password: &str) -> Result<bool> {
                (**self).connection_test(domain, username, password).await
            }

            async fn set_credentials(&self, credentials: Credentials) {
                (**self).set_credentials(credentials).await
            }

            async fn list_users(&self, search_term: &str) -> Result<Vec<DirectoryUser>> {
                (**self).list_users(search_term).await
            }

            async fn get_user(&self, account_id: &str) -> Result<Option<DirectoryUser>> {
                (**self).get_user(account_id).await
            }

            async fn create_user(&self, user: &DirectoryUser, password: &str) -> Result<bool> {
                (**self).create_user(user, password).await
            }

            async fn update_user(&self, user: &DirectoryUser) -> Result<bool> {
                (**self).update_user(user).await
            }

            async fn delete_user(&self, account_id: &str) -> Result<bool> {
                (**self).delete_user(account_id).await
            }

            async fn enable_user(&self, account_id: &str) -> Result<bool> {
                (**self).enable_user(account_id).await
            }

            async fn disable_user(&self, account_id: &str) -> Result<bool> {
                (**self).disable_user(account_id).await
            }

            async fn reset_password(&self, account_id: &str, new_password: &str, must_change: bool) -> Result<bool> {
                (**self).reset_password(account_id, new_password, must_change).await
            }

            async fn unlock_account(&self, account_id: &str) -> Result<bool> {
                (**self).unlock_account(account_id).await
            }

            async fn list_groups(&self, search_term: &str) -> Result<Vec<DirectoryGroup>> {
                (**self).list_groups(search_term).await
            }

            async fn get_group(&self, name: &str) -> Result<Option<DirectoryGroup>> {
                (**self).get_group(name).await
            }

            async fn create_group(&self, group: &DirectoryGroup) -> Result<bool> {
                (**self).create_group(group).await
            }

            async fn delete_group(&self, name: &str) -> Result<bool> {
                (**self).delete_group(name).await
            }

            async fn add_user_to_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
                (**self).add_user_to_group(group_name, account_id).await
            }

            async fn remove_user_from_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
                (**self).remove_user_from_group(group_name, account_id).await
            }

            async fn get_domain_stats(&self) -> Result<DomainStats> {
                (**self).get_domain_stats().await
            }
        }
    )+};
}

forward_directory_operations!(Arc<T>, Box<T>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("corp.example", "CORP\\admin", "hunter2")
            .with_default_ou("OU=Staff,DC=corp,DC=example");

        let debug = format!("{:?}", creds);
        assert!(debug.contains("corp.example"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("hunter2"));
    }
}
