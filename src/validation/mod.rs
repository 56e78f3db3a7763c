//! Record Validation Module
//!
//! Checks inbound payloads against the order schema and turns them into
//! typed [`Order`]s. The ingestion loop depends only on the [`Validator`]
//! trait, never on the schema engine.

use jsonschema::Draft;
use serde_json::Value;

use crate::error::{OrderError, Result};
use crate::models::Order;

/// Draft-07 schema every inbound order must satisfy.
pub const ORDER_SCHEMA: &str = include_str!("order_schema.json");

/// Upper bound on violations quoted in a single validation error
const MAX_REPORTED_VIOLATIONS: usize = 10;

// == Validator Trait ==
/// Structural check plus deserialization of a raw payload.
pub trait Validator: Send + Sync {
    /// Returns the decoded order, or [`OrderError::Validation`] describing
    /// every problem found.
    fn validate(&self, payload: &[u8]) -> Result<Order>;
}

// == Schema Validator ==
/// [`Validator`] backed by a compiled JSON Schema.
pub struct SchemaValidator {
    schema: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compiles the built-in order schema.
    pub fn new() -> Result<Self> {
        Self::with_schema(ORDER_SCHEMA)
    }

    /// Compiles a caller-supplied draft-07 schema.
    pub fn with_schema(schema: &str) -> Result<Self> {
        let schema: Value =
            serde_json::from_str(schema).map_err(|e| OrderError::Schema(e.to_string()))?;
        let schema = jsonschema::options()
            .with_draft(Draft::Draft7)
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|e| OrderError::Schema(e.to_string()))?;

        Ok(Self { schema })
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, payload: &[u8]) -> Result<Order> {
        let instance: Value = serde_json::from_slice(payload)
            .map_err(|e| OrderError::Validation(format!("payload is not JSON: {}", e)))?;

        let violations: Vec<String> = self
            .schema
            .iter_errors(&instance)
            .take(MAX_REPORTED_VIOLATIONS)
            .map(|e| e.to_string())
            .collect();
        if !violations.is_empty() {
            return Err(OrderError::Validation(violations.join("; ")));
        }

        let order: Order = serde_json::from_value(instance)
            .map_err(|e| OrderError::Validation(format!("payload does not decode: {}", e)))?;
        if order.is_empty() {
            return Err(OrderError::Validation("order_uid is empty".to_string()));
        }

        Ok(order)
    }
}
