//! Backing stores that the cache decorators wrap.

pub mod simulated;

pub use simulated::SimulatedUserDirectory;
