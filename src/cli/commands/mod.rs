//! CLI command implementations.

pub mod scenario;
pub mod stress;
