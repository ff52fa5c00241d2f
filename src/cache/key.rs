//! Cache key derivation
//!
//! A key is an operation namespace plus a parameter. List keys keep the search
//! term verbatim so differently filtered queries never collide. Entity keys use
//! the lower-cased account name because directory identities are
//! case-insensitive.

use crate::schema::normalize_account;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Read operation a cache entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyNamespace {
    UserList,
    User,
    GroupList,
    Group,
    DomainStats,
}

impl KeyNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyNamespace::UserList => "list_users",
            KeyNamespace::User => "user",
            KeyNamespace::GroupList => "list_groups",
            KeyNamespace::Group => "group",
            KeyNamespace::DomainStats => "domain_stats",
        }
    }

    /// Whether identifiers in this namespace are directory identities
    fn is_identity(&self) -> bool {
        matches!(self, KeyNamespace::User | KeyNamespace::Group)
    }
}

impl fmt::Display for KeyNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a cached read result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: KeyNamespace,
    identifier: String,
}

impl CacheKey {
    pub fn user_list(search_term: &str) -> Self {
        CacheKeyBuilder::new(KeyNamespace::UserList)
            .identifier(search_term)
            .build()
    }

    pub fn user(account_id: &str) -> Self {
        CacheKeyBuilder::new(KeyNamespace::User)
            .identifier(account_id)
            .build()
    }

    pub fn group_list(search_term: &str) -> Self {
        CacheKeyBuilder::new(KeyNamespace::GroupList)
            .identifier(search_term)
            .build()
    }

    pub fn group(name: &str) -> Self {
        CacheKeyBuilder::new(KeyNamespace::Group)
            .identifier(name)
            .build()
    }

    pub fn domain_stats() -> Self {
        CacheKeyBuilder::new(KeyNamespace::DomainStats).build()
    }

    pub fn namespace(&self) -> KeyNamespace {
        self.namespace
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.identifier.is_empty() && self.namespace == KeyNamespace::DomainStats {
            write!(f, "{}", self.namespace)
        } else {
            write!(f, "{}::{}", self.namespace, self.identifier)
        }
    }
}

/// Builder applying the normalization rules of each namespace
pub struct CacheKeyBuilder {
    namespace: KeyNamespace,
    identifier: String,
}

impl CacheKeyBuilder {
    pub fn new(namespace: KeyNamespace) -> Self {
        Self {
            namespace,
            identifier: String::new(),
        }
    }

    /// Set the operation parameter
    pub fn identifier(mut self, id: impl Into<String>) -> Self {
        self.identifier = id.into();
        self
    }

    pub fn build(self) -> CacheKey {
        let identifier = if self.namespace.is_identity() {
            normalize_account(&self.identifier)
        } else {
            self.identifier
        };

        CacheKey {
            namespace: self.namespace,
            identifier,
        }
    }
}
