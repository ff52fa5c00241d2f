//! Directory Stack Demo
//!
//! Wires logging, configuration and the caching/retry stack over an
//! in-memory directory, then runs a few reads and writes.
//!
//! Usage:
//!   cargo run --example stack_demo
//!
//! Environment variables (also read from `.env`):
//!   RUST_LOG                        - log filter (default: directory_resilience=debug)
//!   DIRECTORY_CACHE_TTL_SECONDS     - cache lifetime (default: 300)
//!   DIRECTORY_MAX_RETRY_ATTEMPTS    - attempts per call (default: 3)
//!   DIRECTORY_SETTINGS              - optional JSON settings file

use directory_resilience::{
    init_logging, Credentials, DirectoryGroup, DirectoryOperations, DirectoryStack,
    DirectoryUser, InMemoryDirectory, ServiceConfig,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("directory_resilience=debug,stack_demo=info");

    info!("=== Directory Stack Demo ===");

    let config = match std::env::var("DIRECTORY_SETTINGS") {
        Ok(path) => {
            let mut config = ServiceConfig::from_json_file(&path)?;
            config.apply_overrides(|name| std::env::var(name).ok())?;
            config
        }
        Err(_) => ServiceConfig::from_env()?,
    };
    info!("Settings: {}", serde_json::to_string(&config)?);

    let directory = InMemoryDirectory::new();
    let stack = DirectoryStack::build(directory.clone(), &config)?;

    stack
        .set_credentials(Credentials::new("corp.example", "CORP\\admin", "secret"))
        .await;

    directory
        .insert_user(DirectoryUser::new("jdoe", "John Doe").with_email("jdoe@corp.example"))
        .await;
    directory
        .insert_user(DirectoryUser::new("asmith", "Alice Smith"))
        .await;
    directory
        .insert_group(DirectoryGroup::new("Helpdesk").with_description("First line support"))
        .await;

    info!("\n--- Reads ---");
    for _ in 0..2 {
        let users = stack.list_users("").await?;
        info!("Found {} users", users.len());
    }
    let stats = stack.get_domain_stats().await?;
    info!(
        "{} users ({:.1}% enabled), {} groups",
        stats.total_users,
        stats.enabled_percentage(),
        stats.total_groups
    );

    info!("\n--- Writes ---");
    let created = stack
        .create_user(&DirectoryUser::new("bwayne", "Bruce Wayne"), "Passw0rd!")
        .await?;
    info!("Created bwayne: {}", created);

    let added = stack.add_user_to_group("Helpdesk", "bwayne").await?;
    info!("Added bwayne to Helpdesk: {}", added);

    let missing = stack.disable_user("nobody").await?;
    info!("Disabled nobody: {}", missing);

    if let Some(group) = stack.get_group("helpdesk").await? {
        info!("{}: {}", group.name, group.member_count_text());
    }
    if let Some(user) = stack.get_user("bwayne").await? {
        info!("{} is {} ({})", user.account_name, user.status_text(), user.distinguished_name);
    }

    info!("\n--- Cache ---");
    info!("{}", stack.cache().stats().await);

    Ok(())
}
