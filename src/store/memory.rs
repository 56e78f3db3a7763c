//! In-memory store backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::OrderStore;
use crate::error::StoreError;

/// Process-local [`OrderStore`]. Counts point reads so callers can check
/// which lookups reached the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Vec<u8>>>,
    reads: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if no records are held.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of `get` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn upsert(&self, order_uid: &str, data: &[u8]) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(order_uid) {
            return Ok(false);
        }
        records.insert(order_uid.to_string(), data.to_vec());
        Ok(true)
    }

    async fn get(&self, order_uid: &str) -> Result<Vec<u8>, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.records
            .read()
            .await
            .get(order_uid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(order_uid.to_string()))
    }

    async fn scan_all(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
