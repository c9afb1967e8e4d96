//! `SQLite`-backed implementation of the repokit entity accessor.
//!
//! This crate provides [`SqliteEntityAccessor`], a generic
//! implementation of the `repokit-core` `EntityStore` port over a sqlx
//! `SQLite` pool, plus construction helpers ([`AccessorFactory`],
//! [`connect_database`]). One accessor serves one entity type;
//! construction validates the entity's declared binding against the
//! live schema and fails with `InvalidModelType` on any mismatch.

#![deny(unsafe_code)]

pub mod accessor;
pub mod factory;
pub mod setup;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

// Re-export the accessor implementation
pub use accessor::{DEFAULT_ORDER_COLUMN, SqliteEntityAccessor};

// Re-export factory for convenient access
pub use factory::AccessorFactory;

// Re-export TestDb for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

// Re-export setup functions for convenient access
pub use setup::connect_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
