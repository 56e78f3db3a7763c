//! Cache Module
//!
//! Provides the in-memory order cache with TTL expiration.

mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::OrderCache;

// == Public Constants ==
/// Default time an entry stays readable after its last write
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// Default interval between eviction sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// Shortest interval the sweep task accepts; smaller values are raised to it
pub const MIN_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);
