//! Order Service Module
//!
//! The only component allowed to write to the durable store or the cache.

mod order_service;

pub use order_service::OrderService;
