//! Order Service
//!
//! Write path: store first, then cache. Read path: cache first, then store,
//! refilling the cache on a store hit. There is no transaction spanning the
//! two; the store is authoritative and a missing cache entry is always
//! recoverable through the read path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::OrderCache;
use crate::error::{OrderError, Result, StoreError};
use crate::models::Order;
use crate::store::OrderStore;

/// Coordinates the durable store and the cache for orders.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    cache: OrderCache,
    store_timeout: Duration,
}

impl OrderService {
    /// Creates a service over `store` and `cache`.
    ///
    /// # Arguments
    /// * `store` - Durable backend, the source of truth
    /// * `cache` - Cache handle this service keeps in sync
    /// * `store_timeout` - Deadline applied to each point read and write
    pub fn new(store: Arc<dyn OrderStore>, cache: OrderCache, store_timeout: Duration) -> Self {
        Self {
            store,
            cache,
            store_timeout,
        }
    }

    /// Returns the cache this service writes to.
    pub fn cache(&self) -> &OrderCache {
        &self.cache
    }

    // == Restore Cache ==
    /// Loads every stored order into the cache.
    ///
    /// Run once at startup before serving reads. Either every stored order is
    /// loaded or an error is returned and the cache is left as it was.
    /// The full scan is not bounded by the per-call store timeout.
    pub async fn restore_cache(&self) -> Result<usize> {
        let rows = self
            .store
            .scan_all()
            .await
            .map_err(|e| OrderError::store("restore cache", e))?;

        let orders = rows
            .iter()
            .map(|row| serde_json::from_slice::<Order>(row))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let count = orders.len();
        for order in orders {
            self.cache.set(order).await;
        }

        info!(count, "Cache restored from store");
        Ok(count)
    }

    // == Get Order ==
    /// Looks up an order, serving from the cache when possible.
    ///
    /// A cache hit never touches the store. On a miss the store is read and,
    /// if the order exists, the cache is refilled before returning.
    pub async fn get_order(&self, order_uid: &str) -> Result<Arc<Order>> {
        if let Some(order) = self.cache.get(order_uid).await {
            debug!(order_uid, "Cache hit");
            return Ok(order);
        }

        let data = match self.bounded(self.store.get(order_uid)).await {
            Ok(data) => data,
            Err(StoreError::NotFound(_)) => {
                return Err(OrderError::NotFound(order_uid.to_string()))
            }
            Err(err) => return Err(OrderError::store("fetch order", err)),
        };

        let order = Arc::new(serde_json::from_slice::<Order>(&data)?);
        self.cache.set(Arc::clone(&order)).await;
        debug!(order_uid, "Cache filled from store");
        Ok(order)
    }

    // == Process Order ==
    /// Persists an order and mirrors it into the cache.
    ///
    /// Redelivered orders are accepted: a duplicate identifier is a no-op in
    /// the store and leaves the cache as it is. On a store failure the cache
    /// is not touched and the error is returned.
    pub async fn process_order(&self, order: Order) -> Result<()> {
        if order.is_empty() {
            return Err(OrderError::InvalidInput(
                "order has no order_uid".to_string(),
            ));
        }

        let data = serde_json::to_vec(&order)?;
        let inserted = self
            .bounded(self.store.upsert(&order.order_uid, &data))
            .await
            .map_err(|e| OrderError::store("save order", e))?;

        if inserted {
            debug!(order_uid = %order.order_uid, "Order persisted");
            self.cache.set(order).await;
        } else {
            // Also reached when an earlier attempt committed but timed out; the
            // order is then cached by the next read, not here.
            debug!(order_uid = %order.order_uid, "Duplicate order ignored");
        }
        Ok(())
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, StoreError>>,
    ) -> std::result::Result<T, StoreError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.store_timeout)),
        }
    }
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService")
            .field("cache", &self.cache)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}
