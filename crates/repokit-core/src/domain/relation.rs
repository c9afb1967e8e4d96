//! Relation declarations.
//!
//! An entity type declares its relations statically; the accessor reads
//! the list once at construction and eager-loads exactly these for every
//! `*_with_relations` operation.

/// A named association from one entity table to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Name under which loaded rows are attached (e.g. `"comments"`).
    pub name: &'static str,
    /// Table the related rows live in.
    pub table: &'static str,
    pub kind: RelationKind,
}

/// How the related table is keyed against the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Related rows carry the parent's id in `foreign_key`.
    HasMany { foreign_key: &'static str },
    /// The parent row carries the related row's id in `foreign_key`;
    /// the related table is keyed by its `id` column.
    BelongsTo { foreign_key: &'static str },
}

impl Relation {
    pub const fn has_many(
        name: &'static str,
        table: &'static str,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            name,
            table,
            kind: RelationKind::HasMany { foreign_key },
        }
    }

    pub const fn belongs_to(
        name: &'static str,
        table: &'static str,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            name,
            table,
            kind: RelationKind::BelongsTo { foreign_key },
        }
    }
}
