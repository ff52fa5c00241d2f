//! Directory entity schema
//!
//! These are the values carried through the decorator layers. The layers treat
//! them as opaque: they are cloned into and out of the cache and never modified.

pub mod group;
pub mod stats;
pub mod user;

pub use group::{DirectoryGroup, GroupMember, MemberKind};
pub use stats::DomainStats;
pub use user::DirectoryUser;

/// Normalize an account key for case-insensitive comparison
pub fn normalize_account(id: &str) -> String {
    id.trim().to_lowercase()
}
