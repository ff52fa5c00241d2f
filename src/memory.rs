//! Process-local directory backend
//!
//! [`InMemoryDirectory`] implements [`DirectoryOperations`] over a couple of
//! hash maps. It follows the result conventions of a real directory client:
//! writes against missing entities return `Ok(false)`, duplicates fail with
//! `AlreadyExists`, and every operation except `connection_test` fails with
//! `CredentialsNotSet` until credentials are supplied.

use crate::error::{DirectoryError, Result};
use crate::operations::{Credentials, DirectoryOperations};
use crate::schema::{
    normalize_account, DirectoryGroup, DirectoryUser, DomainStats, GroupMember,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default)]
struct DirectoryState {
    credentials: Option<Credentials>,
    /// Keyed by normalized account name
    users: HashMap<String, DirectoryUser>,
    /// Keyed by normalized group account name
    groups: HashMap<String, DirectoryGroup>,
    locked_out: HashSet<String>,
}

impl DirectoryState {
    fn credentials(&self) -> Result<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or(DirectoryError::CredentialsNotSet)
    }

    /// Container new entities are created in
    fn container(&self) -> Result<String> {
        let credentials = self.credentials()?;
        if !credentials.default_ou.is_empty() {
            return Ok(credentials.default_ou.clone());
        }
        Ok(format!("CN=Users,{}", domain_dn(&credentials.domain)))
    }
}

/// `corp.example` -> `DC=corp,DC=example`
fn domain_dn(domain: &str) -> String {
    domain
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| format!("DC={}", part))
        .collect::<Vec<_>>()
        .join(",")
}

/// An in-memory directory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl InMemoryDirectory {
    /// An empty directory without credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty directory already bound to `domain`
    pub fn with_domain(domain: impl Into<String>) -> Self {
        let state = DirectoryState {
            credentials: Some(Credentials::new(domain, "administrator", "")),
            ..Default::default()
        };

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Store `user` as is, replacing any user with the same account name
    pub async fn insert_user(&self, user: DirectoryUser) {
        let mut state = self.state.write().await;
        state.users.insert(user.normalized_id(), user);
    }

    /// Store `group` as is. The member count follows the member list.
    pub async fn insert_group(&self, mut group: DirectoryGroup) {
        group.member_count = group.members.len();
        let mut state = self.state.write().await;
        state.groups.insert(group.normalized_id(), group);
    }

    /// Mark an account as locked out until `unlock_account` is called
    pub async fn lock_account(&self, account_id: &str) {
        let mut state = self.state.write().await;
        state.locked_out.insert(normalize_account(account_id));
    }

    pub async fn is_locked_out(&self, account_id: &str) -> bool {
        let state = self.state.read().await;
        state.locked_out.contains(&normalize_account(account_id))
    }

    /// Domain of the current credentials, if any
    pub async fn domain(&self) -> Option<String> {
        let state = self.state.read().await;
        state.credentials.as_ref().map(|c| c.domain.clone())
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn group_count(&self) -> usize {
        self.state.read().await.groups.len()
    }
}

#[async_trait]
impl DirectoryOperations for InMemoryDirectory {
    async fn connection_test(&self, domain: &str, username: &str, password: &str) -> Result<bool> {
        let ok = !domain.trim().is_empty() && !username.trim().is_empty() && !password.is_empty();
        debug!("Connection test for {}@{}: {}", username, domain, ok);
        Ok(ok)
    }

    async fn set_credentials(&self, credentials: Credentials) {
        info!("Binding to domain {} as {}", credentials.domain, credentials.username);
        self.state.write().await.credentials = Some(credentials);
    }

    async fn list_users(&self, search_term: &str) -> Result<Vec<DirectoryUser>> {
        let state = self.state.read().await;
        state.credentials()?;

        let mut users: Vec<DirectoryUser> = state
            .users
            .values()
            .filter(|user| user.matches_search(search_term))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.normalized_id().cmp(&b.normalized_id()));

        Ok(users)
    }

    async fn get_user(&self, account_id: &str) -> Result<Option<DirectoryUser>> {
        let state = self.state.read().await;
        state.credentials()?;
        Ok(state.users.get(&normalize_account(account_id)).cloned())
    }

    async fn create_user(&self, user: &DirectoryUser, password: &str) -> Result<bool> {
        if user.account_name.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "account name must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(DirectoryError::Validation(
                "initial password must not be empty".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        let container = state.container()?;

        let id = user.normalized_id();
        if state.users.contains_key(&id) {
            return Err(DirectoryError::AlreadyExists {
                entity: "user",
                id: user.account_name.clone(),
            });
        }

        let cn = if user.display_name.is_empty() {
            &user.account_name
        } else {
            &user.display_name
        };

        let mut created = user.clone();
        created.distinguished_name = format!("CN={},{}", cn, container);
        created.object_guid = created.object_guid.or_else(|| Some(Uuid::new_v4()));
        created.enabled = created.enabled.or(Some(true));
        created.last_password_set = Some(Utc::now());
        created.groups.clear();

        debug!("Created user {}", created.distinguished_name);
        state.users.insert(id, created);
        Ok(true)
    }

    async fn update_user(&self, user: &DirectoryUser) -> Result<bool> {
        let mut state = self.state.write().await;
        state.credentials()?;

        let Some(existing) = state.users.get_mut(&user.normalized_id()) else {
            return Ok(false);
        };

        let mut updated = user.clone();
        // Identity and membership are not editable through an update
        updated.account_name = existing.account_name.clone();
        updated.distinguished_name = existing.distinguished_name.clone();
        updated.object_guid = existing.object_guid;
        updated.groups = existing.groups.clone();
        updated.last_logon = existing.last_logon;
        updated.last_password_set = existing.last_password_set;
        updated.enabled = updated.enabled.or(existing.enabled);

        *existing = updated;
        let id = normalize_account(&existing.account_name);
        let display_name = existing.display_name.clone();
        let memberships = existing.groups.clone();

        // Group members carry the display name too
        for group_name in memberships {
            if let Some(group) = state.groups.get_mut(&normalize_account(&group_name)) {
                for member in group
                    .members
                    .iter_mut()
                    .filter(|member| normalize_account(&member.account_name) == id)
                {
                    member.display_name = display_name.clone();
                }
            }
        }

        Ok(true)
    }

    async fn delete_user(&self, account_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        state.credentials()?;

        let id = normalize_account(account_id);
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }

        state.locked_out.remove(&id);
        for group in state.groups.values_mut() {
            group
                .members
                .retain(|m| normalize_account(&m.account_name) != id);
            group.member_count = group.members.len();
        }

        debug!("Deleted user {}", account_id);
        Ok(true)
    }

    async fn enable_user(&self, account_id: &str) -> Result<bool> {
        set_enabled(&self.state, account_id, true).await
    }

    async fn disable_user(&self, account_id: &str) -> Result<bool> {
        set_enabled(&self.state, account_id, false).await
    }

    async fn reset_password(
        &self,
        account_id: &str,
        new_password: &str,
        must_change: bool,
    ) -> Result<bool> {
        if new_password.is_empty() {
            return Err(DirectoryError::Validation(
                "new password must not be empty".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        state.credentials()?;

        let Some(user) = state.users.get_mut(&normalize_account(account_id)) else {
            return Ok(false);
        };

        // An expired password is recorded as never having been set
        user.last_password_set = if must_change { None } else { Some(Utc::now()) };
        Ok(true)
    }

    async fn unlock_account(&self, account_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        state.credentials()?;

        let id = normalize_account(account_id);
        if !state.users.contains_key(&id) {
            return Ok(false);
        }

        state.locked_out.remove(&id);
        Ok(true)
    }

    async fn list_groups(&self, search_term: &str) -> Result<Vec<DirectoryGroup>> {
        let state = self.state.read().await;
        state.credentials()?;

        let mut groups: Vec<DirectoryGroup> = state
            .groups
            .values()
            .filter(|group| group.matches_search(search_term))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.normalized_id().cmp(&b.normalized_id()));

        Ok(groups)
    }

    async fn get_group(&self, name: &str) -> Result<Option<DirectoryGroup>> {
        let state = self.state.read().await;
        state.credentials()?;
        Ok(state.groups.get(&normalize_account(name)).cloned())
    }

    async fn create_group(&self, group: &DirectoryGroup) -> Result<bool> {
        if group.account_name.trim().is_empty() {
            return Err(DirectoryError::Validation(
                "group name must not be empty".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        let container = state.container()?;

        let id = group.normalized_id();
        if state.groups.contains_key(&id) {
            return Err(DirectoryError::AlreadyExists {
                entity: "group",
                id: group.account_name.clone(),
            });
        }

        let mut created = group.clone();
        created.distinguished_name = format!("CN={},{}", created.name, container);
        created.object_guid = created.object_guid.or_else(|| Some(Uuid::new_v4()));
        created.members.clear();
        created.member_count = 0;

        state.groups.insert(id, created);
        Ok(true)
    }

    async fn delete_group(&self, name: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        state.credentials()?;

        let Some(group) = state.groups.remove(&normalize_account(name)) else {
            return Ok(false);
        };

        let id = group.normalized_id();
        for user in state.users.values_mut() {
            user.groups.retain(|g| normalize_account(g) != id);
        }

        debug!("Deleted group {}", group.account_name);
        Ok(true)
    }

    async fn add_user_to_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        state.credentials()?;

        let state = &mut *state;
        let (Some(group), Some(user)) = (
            state.groups.get_mut(&normalize_account(group_name)),
            state.users.get_mut(&normalize_account(account_id)),
        ) else {
            return Ok(false);
        };

        if group.has_member(&user.account_name) {
            return Ok(false);
        }

        group
            .members
            .push(GroupMember::user(&user.account_name, &user.display_name));
        group.member_count = group.members.len();
        user.groups.push(group.account_name.clone());

        Ok(true)
    }

    async fn remove_user_from_group(&self, group_name: &str, account_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        state.credentials()?;

        let Some(group) = state.groups.get_mut(&normalize_account(group_name)) else {
            return Ok(false);
        };

        let id = normalize_account(account_id);
        let before = group.members.len();
        group
            .members
            .retain(|m| normalize_account(&m.account_name) != id);
        if group.members.len() == before {
            return Ok(false);
        }
        group.member_count = group.members.len();

        let group_id = group.normalized_id();
        if let Some(user) = state.users.get_mut(&id) {
            user.groups.retain(|g| normalize_account(g) != group_id);
        }

        Ok(true)
    }

    async fn get_domain_stats(&self) -> Result<DomainStats> {
        let state = self.state.read().await;
        let credentials = state.credentials()?;

        let total_users = state.users.len();
        let enabled_users = state.users.values().filter(|u| u.is_enabled()).count();

        Ok(DomainStats {
            total_users,
            enabled_users,
            disabled_users: total_users - enabled_users,
            total_groups: state.groups.len(),
            domain_name: credentials.domain.clone(),
            domain_controller: credentials.domain.clone(),
        })
    }
}

async fn set_enabled(state: &RwLock<DirectoryState>, account_id: &str, enabled: bool) -> Result<bool> {
    let mut state = state.write().await;
    state.credentials()?;

    match state.users.get_mut(&normalize_account(account_id)) {
        Some(user) => {
            user.enabled = Some(enabled);
            Ok(true)
        }
        None => Ok(false),
    }
}
