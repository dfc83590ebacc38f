//! In-memory user directory with a fixed simulated round-trip latency.
//!
//! Valid ids are `1..=size`; every accepted lookup counts as a backing-store
//! hit, which is what the stress driver measures cache pressure against.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{DirectoryConfig, User};
use crate::domain::ports::UserRepository;

/// Simulated user backing store.
#[derive(Debug)]
pub struct SimulatedUserDirectory {
    size: u64,
    latency: Duration,
    db_hits: AtomicU64,
}

impl SimulatedUserDirectory {
    pub const fn new(size: u64, latency: Duration) -> Self {
        Self {
            size,
            latency,
            db_hits: AtomicU64::new(0),
        }
    }

    pub const fn from_config(config: &DirectoryConfig) -> Self {
        Self::new(config.size, Duration::from_millis(config.latency_ms))
    }

    /// Number of lookups that reached the backing store.
    pub fn db_hits(&self) -> u64 {
        self.db_hits.load(Ordering::Relaxed)
    }

    pub const fn size(&self) -> u64 {
        self.size
    }

    pub const fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl UserRepository for SimulatedUserDirectory {
    async fn get_user(&self, uid: u64) -> CacheResult<User> {
        if uid < 1 || uid > self.size {
            return Err(CacheError::invalid_key(format!("invalid uid: {uid}")));
        }

        self.db_hits.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(self.latency).await;

        Ok(User::numbered(uid))
    }
}
