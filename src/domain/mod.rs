//! Domain layer for the coalescing cache
//!
//! This module contains the error taxonomy and the plain data models
//! shared by the cache services, configuration, and CLI.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{CacheError, CacheResult, ConfigError};
