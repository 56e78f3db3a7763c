//! Durable Store Module
//!
//! The store is the source of truth for orders. Records are opaque blobs keyed
//! by order identifier; encoding is the caller's concern.

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::{PgOrderStore, PgStoreConfig};

// == Order Store Trait ==
/// Persistence backend keyed by order identifier.
///
/// Implementations must make each call atomic and safe to issue from many
/// tasks at once.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts `data` under `order_uid` unless a record already exists.
    ///
    /// Returns `Ok(true)` when a record was written and `Ok(false)` when the
    /// identifier was already present. A duplicate is never an error.
    async fn upsert(&self, order_uid: &str, data: &[u8]) -> Result<bool, StoreError>;

    /// Reads the record for `order_uid`, or [`StoreError::NotFound`].
    async fn get(&self, order_uid: &str) -> Result<Vec<u8>, StoreError>;

    /// Reads every stored record.
    async fn scan_all(&self) -> Result<Vec<Vec<u8>>, StoreError>;
}
