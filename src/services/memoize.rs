//! Memoized async functions.
//!
//! [`Memoized`] pairs an async function with a [`CoalescingCache`] keyed by
//! the function's arguments. Multi-argument functions take a tuple, which
//! gives a composite key that is equal (and hashes equally) whenever every
//! argument is equal.

use std::fmt;
use std::future::Future;
use std::hash::Hash;

use crate::domain::errors::CacheError;
use crate::domain::models::CacheStats;
use crate::services::coalescing_cache::CoalescingCache;

/// An async function whose results are cached per argument set.
pub struct Memoized<A, V, F, E = CacheError> {
    cache: CoalescingCache<A, V, E>,
    function: F,
}

impl<A, V, F, E> Memoized<A, V, F, E> {
    pub const fn new(cache: CoalescingCache<A, V, E>, function: F) -> Self {
        Self { cache, function }
    }

    /// The underlying cache, for stats or invalidation.
    pub const fn cache(&self) -> &CoalescingCache<A, V, E> {
        &self.cache
    }
}

impl<A, V, F, Fut, E> Memoized<A, V, F, E>
where
    A: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + fmt::Display + Send + Sync + 'static,
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    /// Call the wrapped function, reusing a committed or in-flight result for equal arguments.
    pub async fn call(&self, args: A) -> Result<V, E> {
        let key = args.clone();
        self.cache
            .get_or_compute(key, || (self.function)(args))
            .await
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl<K, V, E> CoalescingCache<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + fmt::Display + Send + Sync + 'static,
{
    /// Wrap `function` so its calls go through this cache.
    pub fn memoize<F, Fut>(&self, function: F) -> Memoized<K, V, F, E>
    where
        F: Fn(K) -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        Memoized::new(self.clone(), function)
    }
}

impl<A, V, F, E> fmt::Debug for Memoized<A, V, F, E>
where
    A: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
