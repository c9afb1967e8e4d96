//! Entity store trait definition.
//!
//! This port defines the uniform operation menu an accessor offers over
//! one entity type. Implementations own all storage details; column and
//! field names supplied by callers are validated against the entity's
//! declared columns before reaching the backend.

use async_trait::async_trait;

use super::entity::{Entity, EntityRef};
use super::AccessorError;
use crate::domain::{DeleteOutcome, Loaded, Page, SortOrder, Value};

/// Uniform query/mutation operations over one entity type.
///
/// `columns` parameters are projections: `None` selects every column,
/// `Some(..)` a validated subset. `*_with_relations` variants
/// eager-load the entity's declared relation list in batched queries.
///
/// # Design Rules
///
/// - No storage types in signatures
/// - Every operation delegates to the backend; no caching or retry
/// - `delete` is the only non-propagating operation (see
///   [`DeleteOutcome`])
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// List every entity.
    async fn list_all(&self, columns: Option<&[&str]>) -> Result<Vec<E>, AccessorError>;

    /// First `limit` entities in the backend's natural order.
    async fn take(&self, limit: u32) -> Result<Vec<E>, AccessorError>;

    /// First `limit` entities matching `field = value`.
    async fn take_by(
        &self,
        limit: u32,
        field: &str,
        value: &Value,
    ) -> Result<Vec<E>, AccessorError>;

    /// Like [`take_by`](Self::take_by), with relations eager-loaded.
    async fn take_by_with_relations(
        &self,
        limit: u32,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Loaded<E>>, AccessorError>;

    /// Up to `limit` randomly ordered matches, relations eager-loaded.
    async fn take_random_by_with_relations(
        &self,
        limit: u32,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Loaded<E>>, AccessorError>;

    /// List every entity with relations eager-loaded.
    async fn list_all_with_relations(
        &self,
        columns: Option<&[&str]>,
    ) -> Result<Vec<Loaded<E>>, AccessorError>;

    /// One page of entities plus pagination metadata.
    ///
    /// `page` is 1-based; `page` and `per_page` are clamped to at
    /// least 1.
    async fn paginate(
        &self,
        page: u32,
        per_page: u32,
        columns: Option<&[&str]>,
    ) -> Result<Page<E>, AccessorError>;

    /// Persist a new entity from a field-value map and return it.
    async fn create(&self, data: &[(&str, Value)]) -> Result<E, AccessorError>;

    /// Merge `data` onto the targeted entity, persist, and return it.
    ///
    /// Returns `Err(AccessorError::NotFound)` if the target does not
    /// exist. An empty `data` map degenerates to a fail-fast find.
    async fn update(&self, data: &[(&str, Value)], target: EntityRef<E>)
        -> Result<E, AccessorError>;

    /// Delete the targeted entity.
    ///
    /// Never raises: failures are folded into the outcome with their
    /// cause in `detail`.
    async fn delete(&self, target: EntityRef<E>) -> DeleteOutcome;

    /// Entities matching `field = value`.
    async fn where_eq(
        &self,
        field: &str,
        value: &Value,
        columns: Option<&[&str]>,
    ) -> Result<Vec<E>, AccessorError>;

    /// Like [`where_eq`](Self::where_eq), with relations eager-loaded.
    async fn where_eq_with_relations(
        &self,
        field: &str,
        value: &Value,
        columns: Option<&[&str]>,
    ) -> Result<Vec<Loaded<E>>, AccessorError>;

    /// Entity with the given id, if present.
    async fn find(&self, id: &E::Id, columns: Option<&[&str]>) -> Result<Option<E>, AccessorError>;

    /// Like [`find`](Self::find), with relations eager-loaded.
    async fn find_with_relations(
        &self,
        id: &E::Id,
        columns: Option<&[&str]>,
    ) -> Result<Option<Loaded<E>>, AccessorError>;

    /// Entity with the given id.
    ///
    /// Returns `Err(AccessorError::NotFound)` if no record matches.
    async fn find_or_fail(&self, id: &E::Id, columns: Option<&[&str]>)
        -> Result<E, AccessorError>;

    /// First entity matching `field = value`, if any.
    async fn find_by(
        &self,
        field: &str,
        value: &Value,
        columns: Option<&[&str]>,
    ) -> Result<Option<E>, AccessorError>;

    /// Like [`find_by`](Self::find_by), with relations eager-loaded.
    async fn find_by_with_relations(
        &self,
        field: &str,
        value: &Value,
        columns: Option<&[&str]>,
    ) -> Result<Option<Loaded<E>>, AccessorError>;

    /// `(id, display)` pairs for every entity, in query order.
    async fn list_id_and(&self, display: &str) -> Result<Vec<(Value, Value)>, AccessorError>;

    /// A single column's values for every entity, in query order.
    async fn list_field(&self, field: &str) -> Result<Vec<Value>, AccessorError>;

    /// `(key, value)` column pairs for every entity, in query order.
    async fn list_fields(&self, key: &str, field: &str)
        -> Result<Vec<(Value, Value)>, AccessorError>;

    /// Entities whose `field` is one of `values`.
    ///
    /// An empty candidate set matches nothing.
    async fn where_in(&self, field: &str, values: &[Value]) -> Result<Vec<E>, AccessorError>;

    /// Like [`where_in`](Self::where_in), with relations eager-loaded.
    async fn where_in_with_relations(
        &self,
        field: &str,
        values: &[Value],
    ) -> Result<Vec<Loaded<E>>, AccessorError>;

    /// One randomly chosen entity, or `None` on an empty table.
    async fn random(&self, columns: Option<&[&str]>) -> Result<Option<E>, AccessorError>;

    /// Every entity sorted by `field` (default `created_at`), relations
    /// eager-loaded.
    async fn order_by(
        &self,
        field: Option<&str>,
        order: SortOrder,
    ) -> Result<Vec<Loaded<E>>, AccessorError>;
}
