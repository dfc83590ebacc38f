//! Memoizing async cache with request coalescing.
//!
//! A key moves through `Absent -> Pending -> Ready | Absent`:
//!
//! - **Ready** keys live in a [`KeyedStore`] and are answered without
//!   touching the producer.
//! - **Pending** keys have exactly one in-flight producer invocation, held
//!   as a [`Shared`] future. Callers arriving while it runs attach to that
//!   future and observe the same outcome.
//! - On settlement the pending handle is removed and, on success, the value
//!   is committed to the store under the same lock, so no caller can see
//!   the key as neither pending nor ready in between.
//!
//! The check-ready / check-pending / register-pending sequence runs under a
//! single `std::sync::Mutex` with no `.await` inside, which is what bounds
//! the producer to at most one execution per key at a time.
//!
//! The registry only keeps a [`WeakShared`]. When every waiter of an
//! in-flight computation is dropped the producer future is dropped with
//! them, and the next caller for that key starts a fresh invocation.
//!
//! A producer panic is caught inside the shared future and re-raised in
//! every waiter, so attached callers never hang on a poisoned handle.

use futures::future::{BoxFuture, Shared, WeakShared};
use futures::FutureExt;
use std::borrow::Borrow;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

use crate::domain::errors::{CacheError, ConfigError};
use crate::domain::models::{CacheConfig, CacheStats, Capacity, FailurePolicy};
use crate::services::keyed_store::KeyedStore;

type Outcome<V, E> = Result<V, E>;
/// What the shared future settles to: the producer's outcome, or its panic message.
type Settled<V, E> = Result<Outcome<V, E>, Arc<str>>;
type SharedOutcome<V, E> = Shared<BoxFuture<'static, Settled<V, E>>>;
type WeakOutcome<V, E> = WeakShared<BoxFuture<'static, Settled<V, E>>>;

/// Registry entry for an in-flight producer invocation.
struct PendingHandle<V, E> {
    generation: u64,
    handle: WeakOutcome<V, E>,
}

struct CacheState<K, V, E> {
    store: KeyedStore<K, Outcome<V, E>>,
    pending: HashMap<K, PendingHandle<V, E>>,
    next_generation: u64,
    stats: CacheStats,
}

impl<K, V, E> CacheState<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Remove the pending handle for `key` if it still belongs to `generation`.
    fn release(&mut self, key: &K, generation: u64) -> bool {
        match self.pending.get(key) {
            Some(pending) if pending.generation == generation => {
                self.pending.remove(key);
                true
            }
            _ => false,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Arc<str> {
    payload
        .downcast_ref::<&str>()
        .map(|msg| Arc::from(*msg))
        .or_else(|| payload.downcast_ref::<String>().map(|msg| Arc::from(msg.as_str())))
        .unwrap_or_else(|| Arc::from("producer panicked"))
}

fn lock<K, V, E>(state: &Mutex<CacheState<K, V, E>>) -> MutexGuard<'_, CacheState<K, V, E>> {
    // Every critical section leaves the state consistent before it can panic.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Async memoizing cache keyed by `K`.
///
/// Cloning is cheap and yields a handle onto the same underlying state.
pub struct CoalescingCache<K, V, E = CacheError> {
    state: Arc<Mutex<CacheState<K, V, E>>>,
    failure_policy: FailurePolicy,
}

impl<K, V, E> Clone for CoalescingCache<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            failure_policy: self.failure_policy,
        }
    }
}

impl<K, V, E> CoalescingCache<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + fmt::Display + Send + Sync + 'static,
{
    /// Create a cache that never commits failures.
    pub fn new(capacity: Capacity) -> Self {
        Self::with_policy(capacity, FailurePolicy::Propagate)
    }

    pub fn with_policy(capacity: Capacity, failure_policy: FailurePolicy) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                store: KeyedStore::new(capacity),
                pending: HashMap::new(),
                next_generation: 0,
                stats: CacheStats::default(),
            })),
            failure_policy,
        }
    }

    /// Create a bounded cache from a raw limit.
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroCapacity`] when `limit` is zero.
    pub fn bounded(limit: usize) -> Result<Self, ConfigError> {
        Capacity::bounded(limit).map(Self::new)
    }

    pub fn unbounded() -> Self {
        Self::new(Capacity::Unbounded)
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_policy(config.capacity, config.failure_policy)
    }

    /// Return the value for `key`, computing it with `producer` on a miss.
    ///
    /// - A committed entry is returned without invoking `producer`.
    /// - If another call for `key` is in flight, this call waits for it and
    ///   returns the same outcome; `producer` is dropped unused.
    /// - Otherwise `producer` is invoked exactly once and its future is
    ///   registered as the in-flight computation for `key` before it is
    ///   first polled.
    ///
    /// Failures are handed to every waiter. Under
    /// [`FailurePolicy::Propagate`] they are not committed, so the next call
    /// for `key` invokes its producer again.
    ///
    /// If the producer future panics, every waiter panics with its message.
    ///
    /// `producer` is called while the cache's internal lock is held; it must
    /// only build its future and not call back into this cache.
    pub async fn get_or_compute<F, Fut>(&self, key: K, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let shared = {
            let mut state = lock(&self.state);

            if let Some(outcome) = state.store.get(&key).cloned() {
                state.stats.hits += 1;
                trace!(key = ?key, "cache hit");
                return outcome;
            }

            let in_flight = state
                .pending
                .get(&key)
                .and_then(|pending| pending.handle.upgrade());

            if let Some(shared) = in_flight {
                state.stats.coalesced += 1;
                debug!(
                    key = ?key,
                    waiters = shared.strong_count().unwrap_or_default(),
                    "attached to in-flight computation"
                );
                shared
            } else {
                state.stats.misses += 1;
                let generation = state.next_generation;
                state.next_generation += 1;

                let shared = self.launch(key.clone(), generation, producer());
                if let Some(handle) = shared.downgrade() {
                    state
                        .pending
                        .insert(key.clone(), PendingHandle { generation, handle });
                }
                debug!(key = ?key, generation, "cache miss, producer invoked");
                shared
            }
        };

        match shared.await {
            Ok(outcome) => outcome,
            Err(message) => panic::resume_unwind(Box::new(message.to_string())),
        }
    }

    /// Wrap the producer future so that settling it updates the registry and store.
    fn launch<Fut>(&self, key: K, generation: u64, future: Fut) -> SharedOutcome<V, E>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let policy = self.failure_policy;
        // Built outside the async block so it also fires if the future is
        // dropped before its first poll.
        let mut guard = AbandonGuard {
            state: Arc::clone(&state),
            key: Some(key),
            generation,
        };

        async move {
            let settled: Settled<V, E> = AssertUnwindSafe(future)
                .catch_unwind()
                .await
                .map_err(|payload| panic_message(payload.as_ref()));

            if let Some(key) = guard.key.take() {
                let mut state = lock(&state);
                state.release(&key, generation);

                let commit = match &settled {
                    Ok(Ok(_)) => true,
                    Ok(Err(err)) => {
                        warn!(key = ?key, error = %err, "producer failed");
                        policy == FailurePolicy::Memoize
                    }
                    Err(message) => {
                        warn!(key = ?key, panic = %message, "producer panicked");
                        false
                    }
                };

                if let (true, Ok(outcome)) = (commit, &settled) {
                    if let Some((evicted, _)) = state.store.put(key.clone(), outcome.clone()) {
                        debug!(key = ?evicted, "evicted least recently used entry");
                    }
                    debug!(key = ?key, generation, "committed result");
                }
            }

            settled
        }
        .boxed()
        .shared()
    }

    /// Drop the committed entry for `key`. An in-flight computation is unaffected.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        lock(&self.state).store.remove(key).is_some()
    }

    /// Drop every committed entry. In-flight computations are unaffected.
    pub fn clear(&self) {
        lock(&self.state).store.clear();
    }

    /// Committed outcome for `key`, without touching its recency or the counters.
    pub fn peek<Q>(&self, key: &Q) -> Option<Result<V, E>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        lock(&self.state).store.peek(key).cloned()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        lock(&self.state).store.contains(key)
    }

    pub fn is_pending<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        // Upgraded handles are dropped after the lock is released; dropping
        // the last one runs the abandon guard, which takes the lock itself.
        let live = lock(&self.state)
            .pending
            .get(key)
            .and_then(|pending| pending.handle.upgrade());
        live.is_some()
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        lock(&self.state).store.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).store.is_empty()
    }

    pub fn capacity(&self) -> Capacity {
        lock(&self.state).store.capacity()
    }

    /// Number of keys with a live in-flight computation.
    pub fn pending_count(&self) -> usize {
        let live: Vec<_> = lock(&self.state)
            .pending
            .values()
            .filter_map(|pending| pending.handle.upgrade())
            .collect();
        live.len()
    }

    pub fn stats(&self) -> CacheStats {
        lock(&self.state).stats
    }

    pub const fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }
}

impl<K, V, E> fmt::Debug for CoalescingCache<K, V, E>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("CoalescingCache")
            .field("capacity", &state.store.capacity())
            .field("len", &state.store.len())
            .field("pending", &state.pending.len())
            .field("stats", &state.stats)
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

/// Releases the pending handle when a producer future is dropped before settling
/// because every waiter went away.
struct AbandonGuard<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    state: Arc<Mutex<CacheState<K, V, E>>>,
    key: Option<K>,
    generation: u64,
}

impl<K, V, E> Drop for AbandonGuard<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            if lock(&self.state).release(&key, self.generation) {
                debug!(key = ?key, generation = self.generation, "in-flight computation abandoned");
            }
        }
    }
}
