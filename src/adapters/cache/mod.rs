//! In-memory caching layer for hot-path repository reads.
//!
//! Wraps repository traits as decorators backed by `CoalescingCache`, so
//! concurrent reads for the same key share one backing-store round trip.

pub mod cached_user_repository;

pub use cached_user_repository::CachedUserRepository;
