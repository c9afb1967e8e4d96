//! `SQLite` accessor implementation.
//!
//! - `sqlite` - the generic `EntityStore` implementation
//! - `sql` - row and value marshaling helpers

pub(crate) mod sql;
pub mod sqlite;

pub use sqlite::{DEFAULT_ORDER_COLUMN, SqliteEntityAccessor};
