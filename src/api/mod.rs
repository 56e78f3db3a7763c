//! API Module
//!
//! HTTP handlers and routing for the read-only order query API.
//!
//! # Endpoints
//! - `GET /order/:id` - Fetch an order by identifier
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
