use serde::{Deserialize, Serialize};

/// Point-in-time view of a cache's counters.
///
/// Every `get_or_compute` call bumps exactly one of the three counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Calls answered from a committed entry.
    pub hits: u64,
    /// Calls that started a producer invocation.
    pub misses: u64,
    /// Calls that attached to an in-flight invocation.
    pub coalesced: u64,
}

impl CacheStats {
    /// Total number of `get_or_compute` calls observed.
    pub const fn requests(&self) -> u64 {
        self.hits + self.misses + self.coalesced
    }

    /// Fraction of calls that did not invoke the producer.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> f64 {
        let total = self.requests();
        if total == 0 {
            return 0.0;
        }
        (self.hits + self.coalesced) as f64 / total as f64
    }
}
