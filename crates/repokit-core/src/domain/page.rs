//! Paged query results.

use serde::Serialize;

/// One page of entities plus the metadata callers need to render
/// pagination controls.
#[derive(Debug, Clone, Serialize)]
pub struct Page<E> {
    pub items: Vec<E>,
    /// Total number of rows across all pages.
    pub total: u64,
    /// 1-based page number this result represents.
    pub page: u32,
    pub per_page: u32,
    /// Last valid page number; at least 1 even for empty result sets.
    pub last_page: u32,
}

impl<E> Page<E> {
    pub fn new(items: Vec<E>, total: u64, page: u32, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let pages = total.div_ceil(u64::from(per_page)).max(1);
        Self {
            items,
            total,
            page: page.max(1),
            per_page,
            last_page: u32::try_from(pages).unwrap_or(u32::MAX),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
