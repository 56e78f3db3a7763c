//! Cache Entry Module
//!
//! Defines a cached order together with the time it was written.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::models::Order;

// == Cache Entry ==
/// A cached order and its write timestamp.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached order, shared so a read copies a pointer rather than the order
    pub order: Arc<Order>,
    /// When the entry was last written
    pub written_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(order: Arc<Order>) -> Self {
        Self {
            order,
            written_at: Instant::now(),
        }
    }

    // == Age ==
    /// Returns how long ago the entry was written.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.written_at)
    }

    // == Is Live ==
    /// Checks whether the entry is still readable under `ttl`.
    ///
    /// Boundary condition: an entry whose age equals the TTL exactly is still
    /// live; it turns stale only once the age exceeds the TTL.
    pub fn is_live(&self, ttl: Duration) -> bool {
        self.age() <= ttl
    }
}
