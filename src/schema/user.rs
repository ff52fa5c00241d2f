//! User entity

use crate::schema::normalize_account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account in the directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryUser {
    /// Logon name, the case-insensitive account key
    pub account_name: String,
    pub display_name: String,
    pub given_name: String,
    pub surname: String,
    pub email: String,
    /// `None` when the backend could not report the account state
    pub enabled: Option<bool>,
    pub last_logon: Option<DateTime<Utc>>,
    pub last_password_set: Option<DateTime<Utc>>,
    pub password_never_expires: bool,
    pub user_cannot_change_password: bool,
    pub distinguished_name: String,
    pub description: String,
    pub user_principal_name: String,
    pub department: String,
    pub title: String,
    pub phone_number: String,
    pub manager: String,
    /// Names of the groups this user belongs to
    pub groups: Vec<String>,
    pub object_guid: Option<Uuid>,
}

impl DirectoryUser {
    /// Create a new enabled user with the given account name and display name
    pub fn new(account_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            display_name: display_name.into(),
            enabled: Some(true),
            ..Default::default()
        }
    }

    /// Set the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Lower-cased account key used for identity comparisons
    pub fn normalized_id(&self) -> String {
        normalize_account(&self.account_name)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled == Some(true)
    }

    pub fn status_text(&self) -> &'static str {
        if self.is_enabled() {
            "Enabled"
        } else {
            "Disabled"
        }
    }

    /// Case-insensitive match on account name, display name or email.
    /// An empty term matches every user.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        [&self.account_name, &self.display_name, &self.email]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Whether the user is a member of `group` (case-insensitive)
    pub fn in_group(&self, group: &str) -> bool {
        let group = normalize_account(group);
        self.groups.iter().any(|g| normalize_account(g) == group)
    }
}
