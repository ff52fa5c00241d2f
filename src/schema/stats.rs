//! Aggregate domain statistics

use serde::{Deserialize, Serialize};

/// User and group counts for the bound domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainStats {
    pub total_users: usize,
    pub enabled_users: usize,
    pub disabled_users: usize,
    pub total_groups: usize,
    pub domain_name: String,
    pub domain_controller: String,
}

impl DomainStats {
    /// Share of enabled users in percent, 0 when the domain has no users
    pub fn enabled_percentage(&self) -> f64 {
        percentage(self.enabled_users, self.total_users)
    }

    /// Share of disabled users in percent, 0 when the domain has no users
    pub fn disabled_percentage(&self) -> f64 {
        percentage(self.disabled_users, self.total_users)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
