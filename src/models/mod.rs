//! Domain and response models
//!
//! `order` holds the persisted record types; `responses` holds the DTOs
//! returned by the query API.

pub mod order;
pub mod responses;

// Re-export commonly used types
pub use order::{Delivery, Item, Order, Payment};
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
