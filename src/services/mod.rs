pub mod coalescing_cache;
pub mod keyed_store;
pub mod memoize;

pub use coalescing_cache::CoalescingCache;
pub use keyed_store::KeyedStore;
pub use memoize::Memoized;
