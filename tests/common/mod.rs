//! Shared test backend: an in-memory directory with call counting and
//! scripted failures.

#![allow(dead_code)]

use async_trait::async_trait;
use directory_resilience::{
    Credentials, DirectoryError, DirectoryGroup, DirectoryOperations, DirectoryUser,
    DomainStats, InMemoryDirectory, Result,
};
use std::collections::HashMap;
use std::sync::Mutex;

struct Failure {
    /// `None` fails every call
    remaining: Option<u32>,
    make: fn() -> DirectoryError,
}

/// Wraps an [`InMemoryDirectory`], counts calls per operation and injects
/// failures or declined writes on demand.
pub struct ScriptedDirectory {
    inner: InMemoryDirectory,
    calls: Mutex<HashMap<&'static str, u32>>,
    failures: Mutex<HashMap<&'static str, Failure>>,
    declined: Mutex<Vec<&'static str>>,
}

impl ScriptedDirectory {
    pub fn new(inner: InMemoryDirectory) -> Self {
        Self {
            inner,
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            declined: Mutex::new(Vec::new()),
        }
    }

    pub fn backend(&self) -> &InMemoryDirectory {
        &self.inner
    }

    /// Calls that reached this backend for `operation`
    pub fn calls(&self, operation: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// The next `times` calls of `operation` fail with `make()`
    pub fn fail_times(&self, operation: &'static str, times: u32, make: fn() -> DirectoryError) {
        self.failures.lock().unwrap().insert(
            operation,
            Failure {
                remaining: Some(times),
                make,
            },
        );
    }

    /// Every call of `operation` fails with `make()` until `heal` is called
    pub fn fail_always(&self, operation: &'static str, make: fn() -> DirectoryError) {
        self.failures.lock().unwrap().insert(
            operation,
            Failure {
                remaining: None,
                make,
            },
        );
    }

    pub fn heal(&self, operation: &str) {
        self.failures.lock().unwrap().remove(operation);
    }

    /// Writes of `operation` return `Ok(false)` without touching the backend
    pub fn decline(&self, operation: &'static str) {
        self.declined.lock().unwrap().push(operation);
    }

    fn enter(&self, operation: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;

        let mut failures = self.failures.lock().unwrap();
        let Some(failure) = failures.get_mut(operation) else {
            return Ok(());
        };

        let error = (failure.make)();
        match failure.remaining.as_mut() {
            None => Err(error),
            Some(0) => Ok(()),
            Some(n) => {
                *n -= 1;
                Err(error)
            }
        }
    }

    fn declines(&self, operation: &str) -> bool {
        self.declined
            .lock()
            .unwrap()
            .iter()
            .any(|declined| *declined == operation)
    }
}

#[async_trait]
impl DirectoryOperations for ScriptedDirectory {
    async fn connection_test(&self, domain: &str, username: &str, password: &str) -> Result<bool> {
        self.enter("connection_test")?;
        self.inner.connection_test(domain, username, password).await
    }

    async fn set_credentials(&self, credentials: Credentials) {
        *self.calls.lock().unwrap().entry("set_credentials").or_insert(0) += 1;
        self.inner.set_credentials(credentials).await
    }

    async fn list_users(&self, search_term: &str) -> Result<Vec<DirectoryUser>> {
        self.enter("list_users")?;
        self.inner.list_users(search_term).await
    }

    async fn get_user(&self, account_id: &str) -> Result<Option<DirectoryUser>> {
        self.enter("get_user")?;
        self.inner.get_user(account_id).await
    }

    async fn create_user(&self, user: &DirectoryUser, password: &str) -> Result<bool> {
        self.enter("create_user")?;
        if self.declines("create_user") {
            return Ok(false);
        }
        self.inner.create_user(user, password).await
    }

    async fn update_user(&self, user: &DirectoryUser) -> Result<bool> {
        self.enter("update_user")?;
        if self.declines("update_user") {
            return Ok(false);
        }
        self.inner.update_user(user).await
    }

    async fn delete_user(&self, account_id: &str) -> Result<bool> {
        self.enter("delete_user")?;
        if self.declines("delete_user") {
            return Ok(false);
        }
        self.inner.delete_user(account_id).await
    }

    async fn enable_user(&self, account_id: &str) -> Result<bool> {
        self.enter("enable_user")?;
        if self.declines("enable_user") {
            return Ok(false);
        }
        self.inner.enable_user(account_id).await
    }

    async fn disable_user(&self, account_id: &str) -> Result<bool> {
        self.enter("disable_user")?;
        if self.declines("disable_user") {
            return Ok(false);
        }
        self.inner.disable_user(account_id).await
    }

    async fn reset_password(
        &self,
        account_id: &str,
        new_password: &str,
        must_change: bool,
    ) -> Result<bool> {
        self.enter("reset_password")?;
        if self.declines("reset_password") {
            return Ok(false);
        }
        self.inner
            .reset_password(account_id, new_password, must_change)
            .await
    }

    async fn unlock_account(&self, account_id: &str) -> Result<bool> {
        self.enter("unlock_account")?;
        if self.declines("unlock_account") {
            return Ok(false);
        }
        self.inner.unlock_account(account_id).await
    }

    async fn list_groups(&self, search_term: &str) -> Result<Vec<DirectoryGroup>> {
        self.enter("list_groups")?;
        self.inner.list_groups(search_term).await
    }

    async fn get_group(&self, name: &str) -> Result<Option<DirectoryGroup>> {
        self.enter("get_group")?;
        self.inner.get_group(name).await
    }

    async fn create_group(&self, group: &DirectoryGroup) -> Result<bool> {
        self.enter("create_group")?;
        if self.declines("create_group") {
            return Ok(false);
        }
        self.inner.create_group(group).await
    }

    async fn delete_group(&self, name: &str) -> Result<bool> {
        self.enter("delete_group")?;
        if self.declines("delete_group") {
            return Ok(false);
        }
        self.inner.delete_group(name).await
    }

    async fn add_user_to_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
        self.enter("add_user_to_group")?;
        if self.declines("add_user_to_group") {
            return Ok(false);
        }
        self.inner.add_user_to_group(group_name, account_id).await
    }

    async fn remove_user_from_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
        self.enter("remove_user_from_group")?;
        if self.declines("remove_user_from_group") {
            return Ok(false);
        }
        self.inner.remove_user_from_group(group_name, account_id).await
    }

    async fn get_domain_stats(&self) -> Result<DomainStats> {
        self.enter("get_domain_stats")?;
        self.inner.get_domain_stats().await
    }
}

/// A directory bound to `corp.example` with two users and one group
pub async fn seeded_directory() -> InMemoryDirectory {
    let directory = InMemoryDirectory::with_domain("corp.example");
    directory
        .insert_user(DirectoryUser::new("jdoe", "John Doe").with_email("jdoe@corp.example"))
        .await;
    directory
        .insert_user(DirectoryUser::new("asmith", "Alice Smith").with_email("asmith@corp.example"))
        .await;
    directory
        .insert_group(DirectoryGroup::new("Helpdesk").with_description("First line support"))
        .await;
    directory
}

pub fn connection_error() -> DirectoryError {
    DirectoryError::Connection("server unavailable".to_string())
}

pub fn timeout_error() -> DirectoryError {
    DirectoryError::Timeout {
        timeout_seconds: 30,
        context: "ldap search".to_string(),
    }
}

pub fn transport_error() -> DirectoryError {
    DirectoryError::Transport("RPC server is unavailable (0x800706BA)".to_string())
}

pub fn permission_error() -> DirectoryError {
    DirectoryError::PermissionDenied("insufficient access rights".to_string())
}
