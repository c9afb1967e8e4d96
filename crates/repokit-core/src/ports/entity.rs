//! Entity binding contract.
//!
//! This is the capability an accessor requires from a mapped type: the
//! table it binds to, its id column, its declared columns, and its
//! relation list. Implementations supply plain static metadata; all
//! query execution stays behind the [`EntityStore`] port.
//!
//! [`EntityStore`]: super::EntityStore

use std::fmt::{Debug, Display};

use crate::domain::{Relation, Value};

/// A mapped entity type.
///
/// Backends additionally require a row-hydration capability (for the
/// sqlx backend, `FromRow`); that bound lives at the implementation
/// site so this contract stays free of storage types. Entities that
/// accept column projections must tolerate absent columns during
/// hydration (for sqlx, struct-level `#[sqlx(default)]`).
pub trait Entity: Send + Sync + Sized + 'static {
    /// Primary key type. Convertible into a bindable [`Value`].
    type Id: Clone + Debug + Display + Into<Value> + Send + Sync + 'static;

    /// Table this type is mapped onto.
    fn table() -> &'static str;

    /// Primary key column.
    fn id_column() -> &'static str {
        "id"
    }

    /// Columns of the mapped table, in declaration order.
    fn columns() -> &'static [&'static str];

    /// Declared relations, in declaration order.
    fn relations() -> &'static [Relation] {
        &[]
    }

    /// Primary key of this instance.
    fn id(&self) -> &Self::Id;
}

/// Target of an update or delete: an id, or an already-loaded entity.
#[derive(Debug, Clone)]
pub enum EntityRef<E: Entity> {
    ById(E::Id),
    ByEntity(E),
}

impl<E: Entity> EntityRef<E> {
    /// The id this reference resolves to.
    pub fn id(&self) -> E::Id {
        match self {
            Self::ById(id) => id.clone(),
            Self::ByEntity(entity) => entity.id().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Widget {
        id: i64,
    }

    impl Entity for Widget {
        type Id = i64;

        fn table() -> &'static str {
            "widgets"
        }

        fn columns() -> &'static [&'static str] {
            &["id"]
        }

        fn id(&self) -> &i64 {
            &self.id
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Widget::id_column(), "id");
        assert!(Widget::relations().is_empty());
    }

    #[test]
    fn test_entity_ref_resolves_id_from_both_arms() {
        let by_id: EntityRef<Widget> = EntityRef::ById(7);
        assert_eq!(by_id.id(), 7);

        let by_entity = EntityRef::ByEntity(Widget { id: 9 });
        assert_eq!(by_entity.id(), 9);
    }
}
