//! Port trait definitions
//!
//! Async trait interfaces that adapters implement:
//! - UserRepository: lookups against a user backing store
//!
//! The cache decorators in `adapters::cache` wrap these traits so callers
//! never depend on whether a lookup is cached.

pub mod user_repository;

pub use user_repository::UserRepository;
