//! Delete results.

use serde::Serialize;

/// Outcome of a delete operation.
///
/// Deletes never raise: every failure during resolution or persistence
/// is folded into `deleted: false`, with the cause preserved in
/// `detail` so callers can still distinguish "nothing matched" from a
/// backend failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
    pub detail: Option<String>,
}

impl DeleteOutcome {
    pub const fn succeeded() -> Self {
        Self {
            deleted: true,
            detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            deleted: false,
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_carries_no_detail() {
        let outcome = DeleteOutcome::succeeded();
        assert!(outcome.deleted);
        assert!(outcome.detail.is_none());
    }

    #[test]
    fn test_failed_preserves_cause() {
        let outcome = DeleteOutcome::failed("no rows matched");
        assert!(!outcome.deleted);
        assert_eq!(outcome.detail.as_deref(), Some("no rows matched"));
    }
}
