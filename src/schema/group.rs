//! Group entity

use crate::schema::normalize_account;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Object class of a group member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    User,
    Group,
}

/// An entry in a group's member list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub account_name: String,
    pub display_name: String,
    pub kind: MemberKind,
}

impl GroupMember {
    pub fn user(account_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            display_name: display_name.into(),
            kind: MemberKind::User,
        }
    }
}

/// A security or distribution group in the directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryGroup {
    /// Group account name, the case-insensitive group key
    pub account_name: String,
    pub name: String,
    pub description: String,
    pub distinguished_name: String,
    pub member_count: usize,
    pub members: Vec<GroupMember>,
    pub object_guid: Option<Uuid>,
}

impl DirectoryGroup {
    /// Create an empty group whose account name and display name are both `name`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            account_name: name.clone(),
            name,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn normalized_id(&self) -> String {
        normalize_account(&self.account_name)
    }

    pub fn member_count_text(&self) -> String {
        format!("{} member(s)", self.member_count)
    }

    /// Case-insensitive match on account name, name or description
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        [&self.account_name, &self.name, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    pub fn has_member(&self, account_name: &str) -> bool {
        let account = normalize_account(account_name);
        self.members
            .iter()
            .any(|m| normalize_account(&m.account_name) == account)
    }
}
