//! Cached wrapper for UserRepository using the coalescing cache.
//!
//! Concurrent lookups for the same uid share one backing-store round trip;
//! completed lookups are kept in an LRU store bounded by the configured
//! capacity. Rejected uids are never cached.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::CacheResult;
use crate::domain::models::{CacheConfig, CacheStats, User};
use crate::domain::ports::UserRepository;
use crate::services::CoalescingCache;

/// Cached user repository decorator.
pub struct CachedUserRepository<R: UserRepository> {
    inner: Arc<R>,
    /// Cache keyed by uid -> User.
    users: CoalescingCache<u64, User>,
}

impl<R: UserRepository + 'static> CachedUserRepository<R> {
    pub fn new(inner: Arc<R>, config: &CacheConfig) -> Self {
        Self::with_cache(inner, CoalescingCache::from_config(config))
    }

    /// Wrap `inner` with an existing cache, e.g. one shared with other callers.
    pub const fn with_cache(inner: Arc<R>, users: CoalescingCache<u64, User>) -> Self {
        Self { inner, users }
    }

    pub const fn inner(&self) -> &Arc<R> {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        self.users.stats()
    }

    /// Drop the cached record for `uid`.
    pub fn invalidate(&self, uid: u64) -> bool {
        self.users.invalidate(&uid)
    }
}

#[async_trait]
impl<R: UserRepository + 'static> UserRepository for CachedUserRepository<R> {
    async fn get_user(&self, uid: u64) -> CacheResult<User> {
        let inner = Arc::clone(&self.inner);
        self.users
            .get_or_compute(uid, move || async move { inner.get_user(uid).await })
            .await
    }
}
