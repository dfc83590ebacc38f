//! Infrastructure layer module
//!
//! This module contains the ambient plumbing around the cache:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)

pub mod config;
pub mod logging;
