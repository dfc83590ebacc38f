//! Coalesce Cache - async memoizing cache
//!
//! Turns any async, fallible computation into a memoized one: repeated
//! calls with the same key reuse a previously computed (or still running)
//! result instead of invoking the computation again.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): error taxonomy, configuration and stats models, ports
//! - **Service Layer** (`services`): `KeyedStore` (LRU) and `CoalescingCache`
//! - **Adapters** (`adapters`): simulated backing store and cached repository decorator
//! - **Infrastructure Layer** (`infrastructure`): figment config loading, tracing setup
//! - **CLI Layer** (`cli`): stress and scenario drivers
//!
//! # Example
//!
//! ```
//! use coalesce_cache::{CacheError, CoalescingCache};
//!
//! # tokio_test::block_on(async {
//! let cache: CoalescingCache<u64, u64> = CoalescingCache::bounded(2).unwrap();
//!
//! let value = cache
//!     .get_or_compute(4, || async { Ok::<_, CacheError>(40) })
//!     .await;
//! assert_eq!(value, Ok(40));
//!
//! // Committed: the producer is not invoked again.
//! let again = cache
//!     .get_or_compute(4, || async { Err(CacheError::producer("unreachable")) })
//!     .await;
//! assert_eq!(again, Ok(40));
//! # });
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{CacheError, CacheResult, ConfigError};
pub use domain::models::{CacheConfig, CacheStats, Capacity, Config, FailurePolicy};
pub use infrastructure::config::ConfigLoader;
pub use services::{CoalescingCache, KeyedStore, Memoized};
