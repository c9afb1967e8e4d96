//! Entities with eager-loaded relations attached.

use std::collections::HashMap;

use serde::Serialize;

/// An entity together with the rows of its declared relations.
///
/// Relation rows are dynamically shaped (each relation targets a
/// different table), so they surface as JSON objects keyed by column
/// name. Every declared relation name is present in `related`, with an
/// empty vector when no related rows exist; `belongs_to` relations
/// carry at most one row.
#[derive(Debug, Clone, Serialize)]
pub struct Loaded<E> {
    pub entity: E,
    pub related: HashMap<String, Vec<serde_json::Value>>,
}

impl<E> Loaded<E> {
    /// Rows loaded for a named relation. Empty for unknown names.
    pub fn related_rows(&self, name: &str) -> &[serde_json::Value] {
        self.related.get(name).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_rows_unknown_name_is_empty() {
        let loaded = Loaded {
            entity: (),
            related: HashMap::new(),
        };
        assert!(loaded.related_rows("comments").is_empty());
    }

    #[test]
    fn test_related_rows_returns_loaded_docs() {
        let mut related = HashMap::new();
        related.insert(
            "comments".to_string(),
            vec![serde_json::json!({ "id": 1, "body": "hi" })],
        );
        let loaded = Loaded {
            entity: (),
            related,
        };
        assert_eq!(loaded.related_rows("comments").len(), 1);
        assert_eq!(loaded.related_rows("comments")[0]["body"], "hi");
    }
}
