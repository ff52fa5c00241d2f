//! Integration tests for the caching layer
//!
//! These tests run the layer over a scripted backend and check:
//! - Read-through caching and TTL expiry
//! - Negative caching of missing entities
//! - Invalidation after successful writes only
//! - Cache clearing on credential changes

mod common;

use common::{connection_error, permission_error, seeded_directory, ScriptedDirectory};
use directory_resilience::cache::{CacheConfig, CacheKey, CachingLayer};
use directory_resilience::{Credentials, DirectoryGroup, DirectoryOperations, DirectoryUser};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

async fn cached_backend(config: CacheConfig) -> (Arc<ScriptedDirectory>, CachingLayer<Arc<ScriptedDirectory>>) {
    let backend = Arc::new(ScriptedDirectory::new(seeded_directory().await));
    let layer = CachingLayer::with_config(backend.clone(), config);
    (backend, layer)
}

#[tokio::test]
async fn test_cache_hit_avoids_backend() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    let first = assert_ok!(layer.list_users("jdoe").await);
    let second = assert_ok!(layer.list_users("jdoe").await);

    assert_eq!(first, second);
    assert_eq!(backend.calls("list_users"), 1);

    let stats = layer.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn test_every_read_is_cached() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    for _ in 0..2 {
        assert_ok!(layer.list_users("").await);
        assert_ok!(layer.get_user("jdoe").await);
        assert_ok!(layer.list_groups("").await);
        assert_ok!(layer.get_group("helpdesk").await);
        assert_ok!(layer.get_domain_stats().await);
    }

    assert_eq!(backend.total_calls(), 5);
    assert_eq!(layer.len().await, 5);
}

#[tokio::test(start_paused = true)]
async fn test_entries_expire_after_ttl() {
    let config = CacheConfig::builder().ttl(Duration::from_secs(60)).build();
    let (backend, layer) = cached_backend(config).await;

    assert_ok!(layer.get_user("jdoe").await);

    tokio::time::advance(Duration::from_secs(59)).await;
    assert_ok!(layer.get_user("jdoe").await);
    assert_eq!(backend.calls("get_user"), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_ok!(layer.get_user("jdoe").await);
    assert_eq!(backend.calls("get_user"), 2);
    assert_eq!(layer.stats().await.expirations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_purge_expired() {
    let config = CacheConfig::builder().ttl(Duration::from_secs(60)).build();
    let (_backend, layer) = cached_backend(config).await;

    assert_ok!(layer.list_users("").await);
    assert_ok!(layer.list_groups("").await);

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(layer.purge_expired().await, 2);
    assert!(layer.is_empty().await);
}

#[tokio::test]
async fn test_successful_write_invalidates_affected_entries() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    let before = assert_ok!(layer.get_user("jdoe").await).unwrap();
    assert!(before.is_enabled());
    assert_ok!(layer.list_users("").await);
    assert_ok!(layer.list_groups("").await);
    assert_ok!(layer.get_domain_stats().await);

    assert!(assert_ok!(layer.disable_user("jdoe").await));

    let after = assert_ok!(layer.get_user("jdoe").await).unwrap();
    assert!(!after.is_enabled());
    assert_eq!(backend.calls("get_user"), 2);

    let stats = assert_ok!(layer.get_domain_stats().await);
    assert_eq!(stats.disabled_users, 1);
    assert_eq!(backend.calls("get_domain_stats"), 2);

    assert_ok!(layer.list_users("").await);
    assert_eq!(backend.calls("list_users"), 2);

    // Group listings embed member attributes
    assert_ok!(layer.list_groups("").await);
    assert_eq!(backend.calls("list_groups"), 2);
}

#[tokio::test]
async fn test_user_update_drops_group_entries() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;
    assert!(assert_ok!(backend.backend().add_user_to_group("helpdesk", "jdoe").await));

    let before = assert_ok!(layer.get_group("helpdesk").await).unwrap();
    assert_eq!(before.members[0].display_name, "John Doe");
    assert_ok!(layer.list_groups("").await);

    let changes = DirectoryUser::new("jdoe", "Johnny Doe");
    assert!(assert_ok!(layer.update_user(&changes).await));

    assert!(!layer.is_cached(&CacheKey::group_list("")).await);
    assert!(!layer.is_cached(&CacheKey::group("helpdesk")).await);

    let after = assert_ok!(layer.get_group("helpdesk").await).unwrap();
    assert_eq!(after.members[0].display_name, "Johnny Doe");
    assert_eq!(backend.calls("get_group"), 2);

    let groups = assert_ok!(layer.list_groups("").await);
    assert_eq!(groups[0].members[0].display_name, "Johnny Doe");
    assert_eq!(backend.calls("list_groups"), 2);
}

#[tokio::test]
async fn test_group_write_drops_user_listings_and_stats() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert_ok!(layer.list_users("").await);
    assert_ok!(layer.list_groups("").await);
    let stats = assert_ok!(layer.get_domain_stats().await);
    assert_eq!(stats.total_groups, 1);

    let ops = DirectoryGroup::new("ops").with_description("Operations");
    assert!(assert_ok!(layer.create_group(&ops).await));

    assert!(!layer.is_cached(&CacheKey::user_list("")).await);
    assert!(!layer.is_cached(&CacheKey::group_list("")).await);
    assert!(!layer.is_cached(&CacheKey::domain_stats()).await);

    let stats = assert_ok!(layer.get_domain_stats().await);
    assert_eq!(stats.total_groups, 2);
    assert_eq!(assert_ok!(layer.list_groups("").await).len(), 2);
    assert_ok!(layer.list_users("").await);
    assert_eq!(backend.calls("list_users"), 2);
}

#[tokio::test]
async fn test_invalidate_all_empties_the_cache() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert_ok!(layer.list_users("").await);
    assert_ok!(layer.get_user("jdoe").await);
    assert_ok!(layer.get_domain_stats().await);

    assert_eq!(layer.invalidate_all().await, 3);
    assert!(layer.is_empty().await);
    assert_eq!(layer.stats().await.invalidations, 3);

    assert_ok!(layer.get_user("jdoe").await);
    assert_eq!(backend.calls("get_user"), 2);
}

#[tokio::test]
async fn test_write_purges_every_search_of_the_namespace() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert_ok!(layer.list_users("").await);
    assert_ok!(layer.list_users("smith").await);
    assert_ok!(layer.list_users("doe").await);

    let user = DirectoryUser::new("bwayne", "Bruce Wayne");
    assert!(assert_ok!(layer.create_user(&user, "Passw0rd!").await));

    assert!(!layer.is_cached(&CacheKey::user_list("")).await);
    assert!(!layer.is_cached(&CacheKey::user_list("smith")).await);
    assert!(!layer.is_cached(&CacheKey::user_list("doe")).await);

    let everyone = assert_ok!(layer.list_users("").await);
    assert_eq!(everyone.len(), 3);
    assert_eq!(backend.calls("list_users"), 4);
}

#[tokio::test]
async fn test_membership_change_invalidates_user_and_group() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert_ok!(layer.get_user("jdoe").await);
    assert_ok!(layer.get_group("helpdesk").await);

    assert!(assert_ok!(layer.add_user_to_group("Helpdesk", "JDOE").await));

    let user = assert_ok!(layer.get_user("jdoe").await).unwrap();
    let group = assert_ok!(layer.get_group("helpdesk").await).unwrap();
    assert!(user.in_group("helpdesk"));
    assert_eq!(group.member_count, 1);
    assert_eq!(backend.calls("get_user"), 2);
    assert_eq!(backend.calls("get_group"), 2);
}

#[tokio::test]
async fn test_failed_write_leaves_cache_untouched() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert_ok!(layer.list_users("").await);
    assert_ok!(layer.get_user("jdoe").await);
    let cached = layer.len().await;

    backend.fail_always("update_user", permission_error);
    assert_err!(layer.update_user(&DirectoryUser::new("jdoe", "Johnny")).await);
    assert_eq!(layer.len().await, cached);

    // A declined write is not a successful one either
    backend.decline("delete_user");
    assert!(!assert_ok!(layer.delete_user("jdoe").await));
    assert_eq!(layer.len().await, cached);

    assert_ok!(layer.list_users("").await);
    assert_ok!(layer.get_user("jdoe").await);
    assert_eq!(backend.calls("list_users"), 1);
    assert_eq!(backend.calls("get_user"), 1);
    assert_eq!(layer.stats().await.invalidations, 0);
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;
    backend.fail_times("list_groups", 1, connection_error);

    assert_err!(layer.list_groups("").await);
    assert!(layer.is_empty().await);

    assert_ok!(layer.list_groups("").await);
    assert_ok!(layer.list_groups("").await);
    assert_eq!(backend.calls("list_groups"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_negative_lookups_use_shorter_ttl() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert!(assert_ok!(layer.get_user("ghost").await).is_none());
    assert!(assert_ok!(layer.get_user("ghost").await).is_none());
    assert_eq!(backend.calls("get_user"), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    assert!(assert_ok!(layer.get_user("ghost").await).is_none());
    assert_eq!(backend.calls("get_user"), 2);

    // Creating the user drops the cached miss
    let ghost = DirectoryUser::new("ghost", "Ghost");
    assert!(assert_ok!(layer.create_user(&ghost, "Passw0rd!").await));
    assert!(assert_ok!(layer.get_user("ghost").await).is_some());
}

#[tokio::test]
async fn test_negative_caching_can_be_disabled() {
    let config = CacheConfig::builder().negative_ttl(Duration::ZERO).build();
    let (backend, layer) = cached_backend(config).await;

    assert_ok!(layer.get_group("ghosts").await);
    assert_ok!(layer.get_group("ghosts").await);
    assert_eq!(backend.calls("get_group"), 2);

    // Positive results are still cached
    assert_ok!(layer.get_group("helpdesk").await);
    assert_ok!(layer.get_group("helpdesk").await);
    assert_eq!(backend.calls("get_group"), 3);
}

#[tokio::test]
async fn test_entity_keys_ignore_case() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert_ok!(layer.get_user("JDoe").await);
    assert_ok!(layer.get_user("jdoe").await);
    assert_ok!(layer.get_user(" JDOE ").await);

    assert_eq!(backend.calls("get_user"), 1);
    assert!(layer.is_cached(&CacheKey::user("jdoe")).await);
}

#[tokio::test]
async fn test_search_terms_are_cached_separately() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert_ok!(layer.list_users("doe").await);
    assert_ok!(layer.list_users("Doe").await);
    assert_ok!(layer.list_users("").await);

    assert_eq!(backend.calls("list_users"), 3);
}

#[tokio::test]
async fn test_credential_change_clears_cache() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert_ok!(layer.list_users("").await);
    assert_ok!(layer.get_domain_stats().await);
    assert_eq!(layer.len().await, 2);

    layer
        .set_credentials(Credentials::new("other.example", "OTHER\\admin", "secret"))
        .await;
    assert!(layer.is_empty().await);
    assert_eq!(backend.calls("set_credentials"), 1);

    let stats = assert_ok!(layer.get_domain_stats().await);
    assert_eq!(stats.domain_name, "other.example");
    assert_ok!(layer.list_users("").await);
    assert_eq!(backend.calls("get_domain_stats"), 2);
    assert_eq!(backend.calls("list_users"), 2);
}

#[tokio::test]
async fn test_disabled_cache_always_reaches_backend() {
    let (backend, layer) = cached_backend(CacheConfig::disabled()).await;

    assert_ok!(layer.list_users("").await);
    assert_ok!(layer.list_users("").await);

    assert_eq!(backend.calls("list_users"), 2);
    assert!(layer.is_empty().await);
    assert_eq!(layer.stats().await.hits, 0);
}

#[tokio::test]
async fn test_connection_test_is_never_cached() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    assert!(assert_ok!(layer.connection_test("corp.example", "admin", "secret").await));
    assert!(assert_ok!(layer.connection_test("corp.example", "admin", "secret").await));

    assert_eq!(backend.calls("connection_test"), 2);
    assert!(layer.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_reads_share_the_cache() {
    let (backend, layer) = cached_backend(CacheConfig::default()).await;

    let (a, b) = futures::join!(layer.list_users(""), layer.list_users(""));
    assert_eq!(assert_ok!(a), assert_ok!(b));

    // Concurrent misses may both reach the backend, later reads may not
    let misses = backend.calls("list_users");
    assert!(misses <= 2);

    assert_ok!(layer.list_users("").await);
    assert_eq!(backend.calls("list_users"), misses);
}

#[tokio::test]
async fn test_capacity_bound() {
    let config = CacheConfig::builder().max_entries(2).build();
    let (_backend, layer) = cached_backend(config).await;

    assert_ok!(layer.list_users("a").await);
    assert_ok!(layer.list_users("b").await);
    assert_ok!(layer.list_users("c").await);

    assert_eq!(layer.len().await, 2);
    assert!(layer.is_cached(&CacheKey::user_list("c")).await);
    assert_eq!(layer.stats().await.evictions, 1);
}
