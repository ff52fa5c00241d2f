//! Write-triggered cache invalidation
//!
//! Invalidation is deliberately coarse. Every successful write drops the
//! affected entity keys, every list entry of the affected entity types and the
//! domain statistics. A search term can match any entity, so no list entry can
//! be proven unaffected.

use crate::cache::key::{CacheKey, KeyNamespace};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason for cache invalidation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationReason {
    /// A user was created, modified or deleted
    UserChanged { account: String },

    /// A group was created or deleted
    GroupChanged { group: String },

    /// A user joined or left a group
    MembershipChanged { group: String, account: String },

    /// The bind credentials changed, possibly pointing at another domain
    CredentialsChanged,

    /// Explicit request from the owner of the cache
    Manual,
}

impl fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationReason::UserChanged { account } => write!(f, "user changed: {}", account),
            InvalidationReason::GroupChanged { group } => write!(f, "group changed: {}", group),
            InvalidationReason::MembershipChanged { group, account } => {
                write!(f, "membership changed: {} in {}", account, group)
            }
            InvalidationReason::CredentialsChanged => write!(f, "credentials changed"),
            InvalidationReason::Manual => write!(f, "manual invalidation"),
        }
    }
}

/// The set of entries a write makes suspect
#[derive(Debug, Clone)]
pub struct InvalidationScope {
    pub reason: InvalidationReason,

    /// Individual entity entries
    pub keys: Vec<CacheKey>,

    /// Namespaces dropped wholesale
    pub namespaces: Vec<KeyNamespace>,

    /// Drop every entry regardless of key
    pub everything: bool,
}

impl InvalidationScope {
    /// Any write to a single user (create, update, delete, enable, disable,
    /// password reset, unlock). Group entries embed member attributes, so they
    /// go too.
    pub fn user(account: &str) -> Self {
        Self {
            reason: InvalidationReason::UserChanged {
                account: account.to_string(),
            },
            keys: vec![CacheKey::user(account)],
            namespaces: vec![
                KeyNamespace::UserList,
                KeyNamespace::Group,
                KeyNamespace::GroupList,
                KeyNamespace::DomainStats,
            ],
            everything: false,
        }
    }

    /// Creation of a group
    pub fn group(name: &str) -> Self {
        Self {
            reason: InvalidationReason::GroupChanged {
                group: name.to_string(),
            },
            keys: vec![CacheKey::group(name)],
            namespaces: vec![
                KeyNamespace::UserList,
                KeyNamespace::GroupList,
                KeyNamespace::DomainStats,
            ],
            everything: false,
        }
    }

    /// Deleting a group also changes the group list of every member
    pub fn group_removed(name: &str) -> Self {
        let mut scope = Self::group(name);
        scope.namespaces.push(KeyNamespace::User);
        scope
    }

    /// Membership change between one user and one group
    pub fn membership(group: &str, account: &str) -> Self {
        Self {
            reason: InvalidationReason::MembershipChanged {
                group: group.to_string(),
                account: account.to_string(),
            },
            keys: vec![CacheKey::group(group), CacheKey::user(account)],
            namespaces: vec![
                KeyNamespace::UserList,
                KeyNamespace::GroupList,
                KeyNamespace::DomainStats,
            ],
            everything: false,
        }
    }

    /// Every entry, for credential changes and explicit clears
    pub fn all(reason: InvalidationReason) -> Self {
        Self {
            reason,
            keys: Vec::new(),
            namespaces: Vec::new(),
            everything: true,
        }
    }

    /// Whether an entry under `key` falls inside this scope
    pub fn covers(&self, key: &CacheKey) -> bool {
        self.everything || self.namespaces.contains(&key.namespace()) || self.keys.contains(key)
    }
}
