//! API Handlers
//!
//! HTTP request handlers for the query endpoints. All writes come from the
//! ingestion loop; nothing here mutates orders.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::models::{HealthResponse, Order, StatsResponse};
use crate::service::OrderService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read path into the cache and store
    pub service: Arc<OrderService>,
}

impl AppState {
    /// Creates a new AppState around the order service.
    pub fn new(service: OrderService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Handler for GET /order/:id
///
/// Returns the order as JSON, 404 if it is unknown, or a generic 500 if the
/// store failed.
pub async fn get_order_handler(
    State(state): State<AppState>,
    Path(order_uid): Path<String>,
) -> Result<Json<Arc<Order>>> {
    let order = state.service.get_order(&order_uid).await?;
    Ok(Json(order))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.service.cache().stats().await;
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
