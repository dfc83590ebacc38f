//! Integration tests for the cached user directory
//!
//! Mirrors the load the stress driver generates: many concurrent lookups over
//! a small id space must reach the backing store once per distinct id.

use coalesce_cache::adapters::cache::CachedUserRepository;
use coalesce_cache::adapters::directory::SimulatedUserDirectory;
use coalesce_cache::domain::models::User;
use coalesce_cache::domain::ports::UserRepository;
use coalesce_cache::{CacheConfig, Capacity, FailurePolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

fn repository(
    size: u64,
    config: &CacheConfig,
) -> (Arc<SimulatedUserDirectory>, Arc<CachedUserRepository<SimulatedUserDirectory>>) {
    let directory = Arc::new(SimulatedUserDirectory::new(size, Duration::from_millis(3)));
    let repo = Arc::new(CachedUserRepository::new(Arc::clone(&directory), config));
    (directory, repo)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_load_hits_each_id_once() {
    let (directory, repo) = repository(100, &CacheConfig::default());
    let mut tasks = JoinSet::new();

    for i in 0..2000_u64 {
        let repo = Arc::clone(&repo);
        let uid = 1 + i % 100;
        tasks.spawn(async move { (uid, repo.get_user(uid).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        let (uid, user) = joined.unwrap();
        assert_eq!(user.unwrap(), User::numbered(uid));
    }

    assert_eq!(directory.db_hits(), 100);
    let stats = repo.stats();
    assert_eq!(stats.misses, 100);
    assert_eq!(stats.hits + stats.coalesced, 1900);
}

#[tokio::test]
async fn test_invalid_ids_are_retried_not_cached() {
    let (directory, repo) = repository(10, &CacheConfig::default());

    for _ in 0..3 {
        let err = repo.get_user(11).await.unwrap_err();
        assert!(err.is_invalid_key());
        assert_eq!(err.to_string(), "Invalid key: invalid uid: 11");
    }

    // Rejections happen before the backing store is touched.
    assert_eq!(directory.db_hits(), 0);
    assert_eq!(repo.stats().misses, 3);
}

#[tokio::test]
async fn test_memoized_invalid_ids_are_replayed() {
    let config = CacheConfig {
        capacity: Capacity::bounded(4).unwrap(),
        failure_policy: FailurePolicy::Memoize,
    };
    let (_, repo) = repository(10, &config);

    assert!(repo.get_user(0).await.is_err());
    assert!(repo.get_user(0).await.is_err());

    let stats = repo.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn test_small_capacity_refetches_evicted_users() {
    let config = CacheConfig {
        capacity: Capacity::bounded(2).unwrap(),
        ..CacheConfig::default()
    };
    let (directory, repo) = repository(10, &config);

    for uid in [1, 2, 3, 1] {
        repo.get_user(uid).await.unwrap();
    }

    // 1 was evicted by 3 and had to be fetched again.
    assert_eq!(directory.db_hits(), 4);

    assert!(repo.invalidate(3));
    repo.get_user(3).await.unwrap();
    assert_eq!(directory.db_hits(), 5);
}
