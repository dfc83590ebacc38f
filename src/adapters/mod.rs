//! Adapters for backing stores and their cache decorators.

pub mod cache;
pub mod directory;
