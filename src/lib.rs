//! Order Cache - order ingestion with a TTL read-through cache
//!
//! Consumes orders from a message stream, persists each one exactly once in
//! a durable store, and serves lookups by identifier from an in-memory cache
//! that is warmed from the store at startup.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;
pub mod validation;

pub use api::AppState;
pub use cache::OrderCache;
pub use config::Config;
pub use error::{OrderError, Result, SourceError, StoreError};
pub use ingest::{IngestConfig, IngestionLoop, MessageSource};
pub use service::OrderService;
pub use store::OrderStore;
pub use validation::{SchemaValidator, Validator};
