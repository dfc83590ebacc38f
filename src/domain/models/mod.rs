pub mod capacity;
pub mod config;
pub mod stats;
pub mod user;

pub use capacity::Capacity;
pub use config::{CacheConfig, Config, DirectoryConfig, FailurePolicy, LoggingConfig};
pub use stats::CacheStats;
pub use user::User;
