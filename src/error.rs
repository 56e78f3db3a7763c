//! Error types for the order service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failures reported by a durable store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists for the identifier
    #[error("record not found: {0}")]
    NotFound(String),

    /// Backend could not be reached or rejected the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The call did not finish within the caller's deadline
    #[error("store call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl StoreError {
    /// Returns true for failures that may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout(_))
    }
}

// == Source Error Enum ==
/// Failures reported by a message stream source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A read failed but the stream is still usable
    #[error("stream read failed: {0}")]
    Transient(String),

    /// The stream has ended and will yield no more messages
    #[error("stream closed")]
    Closed,
}

// == Order Error Enum ==
/// Unified error type for the order pipeline.
#[derive(Error, Debug)]
pub enum OrderError {
    /// Inbound payload is malformed or incomplete
    #[error("validation failed: {0}")]
    Validation(String),

    /// Order is absent from both the cache and the store
    #[error("order not found: {0}")]
    NotFound(String),

    /// Caller handed an empty order to the write path
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Durable store failed while running `operation`
    #[error("{operation} failed: {source}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// A persisted record could not be encoded or decoded
    #[error("order encoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The validation schema itself failed to compile
    #[error("schema error: {0}")]
    Schema(String),
}

impl OrderError {
    /// Wraps a store failure with the name of the operation that issued it.
    pub fn store(operation: &'static str, source: StoreError) -> Self {
        OrderError::StoreUnavailable { operation, source }
    }

    /// Returns true when retrying the same operation could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            OrderError::StoreUnavailable { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            OrderError::NotFound(_) => (StatusCode::NOT_FOUND, "order not found"),
            OrderError::Validation(_) | OrderError::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, "invalid request")
            }
            _ => {
                error!(error = %self, "Order lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the order pipeline.
pub type Result<T> = std::result::Result<T, OrderError>;
