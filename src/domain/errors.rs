//! Domain errors for the coalescing cache.

use thiserror::Error;

/// Failures a producer can report for a key.
///
/// `Clone` because a single settlement is handed to every waiter that
/// coalesced onto the same in-flight computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Producer failed: {0}")]
    ProducerFailure(String),
}

impl CacheError {
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    pub fn producer(msg: impl Into<String>) -> Self {
        Self::ProducerFailure(msg.into())
    }

    /// Whether the failure stems from input validation rather than the backing store.
    pub const fn is_invalid_key(&self) -> bool {
        matches!(self, Self::InvalidKey(_))
    }
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Configuration errors. Raised at construction or load time, never at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid capacity: 0. Must be a positive integer or \"unbounded\"")]
    ZeroCapacity,

    #[error("Invalid capacity: {0}. Must be a positive integer or \"unbounded\"")]
    NegativeCapacity(i64),

    #[error("Invalid capacity: {0:?}. Must be a positive integer or \"unbounded\"")]
    InvalidCapacity(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid directory size: {0}. Must be at least 1")]
    InvalidDirectorySize(u64),

    #[error("Invalid latency_ms: {0}. Must not exceed 60000")]
    InvalidLatency(u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_display() {
        assert_eq!(
            CacheError::invalid_key("uid 0 out of range").to_string(),
            "Invalid key: uid 0 out of range"
        );
        assert_eq!(
            CacheError::producer("connection reset").to_string(),
            "Producer failed: connection reset"
        );
    }

    #[test]
    fn test_is_invalid_key() {
        assert!(CacheError::invalid_key("x").is_invalid_key());
        assert!(!CacheError::producer("x").is_invalid_key());
    }

    #[test]
    fn test_config_error_display() {
        assert!(ConfigError::NegativeCapacity(-3).to_string().contains("-3"));
        assert!(ConfigError::InvalidCapacity("lots".into())
            .to_string()
            .contains("\"lots\""));
    }
}
