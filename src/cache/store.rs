//! Cache Store Module
//!
//! TTL-bounded map from order identifier to order. Staleness is checked on
//! every read; physical removal of stale entries is left to the sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::cache::{CacheEntry, CacheStats, StatsSnapshot};
use crate::models::Order;
use crate::tasks::Sweeper;

// == Order Cache ==
/// Shared in-memory order cache. Cloning yields another handle to the same map.
#[derive(Debug, Clone)]
pub struct OrderCache {
    inner: Arc<CacheInner>,
}

#[derive(Debug)]
struct CacheInner {
    /// Identifier to entry map, at most one entry per identifier
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Maximum age at which an entry is still readable
    ttl: Duration,
    /// Performance statistics
    stats: CacheStats,
}

impl OrderCache {
    // == Constructor ==
    /// Creates an empty cache without a background sweep.
    ///
    /// # Arguments
    /// * `ttl` - Maximum entry age visible to readers
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                ttl,
                stats: CacheStats::new(),
            }),
        }
    }

    // == Constructor With Sweeper ==
    /// Creates an empty cache and starts its eviction sweep.
    ///
    /// The returned [`Sweeper`] owns the background task; stop it on shutdown.
    /// Must be called from within a Tokio runtime.
    pub fn with_sweeper(ttl: Duration, sweep_interval: Duration) -> (Self, Sweeper) {
        let cache = Self::new(ttl);
        let sweeper = Sweeper::start(cache.clone(), sweep_interval);
        (cache, sweeper)
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    // == Set ==
    /// Inserts or replaces the entry for the order's identifier.
    ///
    /// Resets the entry's age to zero. Last writer wins.
    pub async fn set(&self, order: impl Into<Arc<Order>>) {
        let order = order.into();
        let key = order.order_uid.clone();
        let entry = CacheEntry::new(order);

        let mut entries = self.inner.entries.write().await;
        entries.insert(key, entry);
    }

    // == Get ==
    /// Returns the order if present and not older than the TTL.
    ///
    /// Stale entries are reported as missing but left in place for the sweep.
    pub async fn get(&self, order_uid: &str) -> Option<Arc<Order>> {
        let found = {
            let entries = self.inner.entries.read().await;
            entries
                .get(order_uid)
                .filter(|entry| entry.is_live(self.inner.ttl))
                .map(|entry| Arc::clone(&entry.order))
        };

        match found {
            Some(_) => self.inner.stats.record_hit(),
            None => self.inner.stats.record_miss(),
        }
        found
    }

    // == Sweep Expired ==
    /// Removes every entry older than the TTL.
    ///
    /// Returns the number of entries removed.
    pub async fn sweep_expired(&self) -> usize {
        let ttl = self.inner.ttl;
        let removed = {
            let mut entries = self.inner.entries.write().await;
            let before = entries.len();
            entries.retain(|_, entry| entry.is_live(ttl));
            before - entries.len()
        };

        self.inner.stats.record_evictions(removed);
        removed
    }

    // == Length ==
    /// Returns the number of physically present entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> StatsSnapshot {
        let total_entries = self.len().await;
        self.inner.stats.snapshot(total_entries)
    }
}
