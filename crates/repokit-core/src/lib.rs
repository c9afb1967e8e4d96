//! Core contracts for the repokit entity accessor.
//!
//! This crate defines the storage-agnostic half of a generic
//! repository: the [`Entity`] binding contract, the [`EntityStore`]
//! operation menu, and the domain types that cross that port. Concrete
//! backends (e.g. `repokit-db` for `SQLite`) implement [`EntityStore`]
//! and are handed to consumers as plain values or
//! `Arc<dyn EntityStore<E>>` — there is no global registry.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{DeleteOutcome, Loaded, Page, Relation, RelationKind, SortOrder, Value};
pub use ports::{AccessorError, Entity, EntityRef, EntityStore};

// Silence unused dev-dependency warnings until we add mock-based tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
