use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::capacity::Capacity;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Simulated directory used by the CLI drivers
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// What happens to a producer failure once it settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Hand the failure to every waiter and forget it; the next call retries.
    #[default]
    Propagate,
    /// Commit the failure like a value so later calls replay it until evicted.
    Memoize,
}

/// Cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Maximum committed entries (positive integer or "unbounded")
    #[serde(default)]
    pub capacity: Capacity,

    /// Whether producer failures are cached
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for JSON log files (optional, console only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Simulated directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DirectoryConfig {
    /// Number of users; valid ids are `1..=size`
    #[serde(default = "default_directory_size")]
    pub size: u64,

    /// Simulated round-trip latency per lookup, in milliseconds
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

const fn default_directory_size() -> u64 {
    100
}

const fn default_latency_ms() -> u64 {
    3
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            size: default_directory_size(),
            latency_ms: default_latency_ms(),
        }
    }
}
