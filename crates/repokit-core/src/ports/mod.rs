//! Port definitions (trait abstractions) for storage backends.
//!
//! Ports define the interfaces the core contracts expect from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No storage-crate types in any signature
//! - Entity metadata is static; query execution lives behind the store
//!   trait
//! - Construction of a concrete store validates the entity binding and
//!   is the only place `InvalidModelType` can surface

pub mod entity;
pub mod entity_store;

use thiserror::Error;

// Re-export port traits for convenience
pub use entity::{Entity, EntityRef};
pub use entity_store::EntityStore;

/// Domain-specific errors for accessor operations.
///
/// This error type abstracts away storage implementation details
/// (e.g., sqlx errors) and provides a clean interface for callers to
/// handle storage failures.
#[derive(Debug, Error)]
pub enum AccessorError {
    /// The entity binding does not match the connected store: its
    /// table, a declared column, or a relation target is missing.
    /// Fatal to that accessor instance.
    #[error("Invalid model type: {0}")]
    InvalidModelType(String),

    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A caller-supplied column or field name is not declared by the
    /// entity.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Storage backend error (database, connection pool, etc.).
    #[error("Storage error: {0}")]
    Storage(String),
}
