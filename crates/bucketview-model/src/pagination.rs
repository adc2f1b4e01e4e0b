//! Client-side page windowing state.

use serde::{Deserialize, Serialize};

/// Default number of rows per page.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 50;

/// Current page and page count for the rendered table.
///
/// Invariant: `1 <= current_page <= total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// 1-based page being shown.
    pub current_page: usize,
    /// Number of pages the loaded entries span, at least 1.
    pub total_pages: usize,
    /// Fixed page size.
    pub items_per_page: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

impl PaginationState {
    /// Fresh state on page 1 of 1. A zero page size is treated as 1.
    #[must_use]
    pub fn new(items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            items_per_page: items_per_page.max(1),
        }
    }

    /// Page count for `total_items` entries.
    #[must_use]
    pub fn pages_for(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.items_per_page).max(1)
    }

    /// Recompute `total_pages` and clamp the current page into range.
    pub fn recompute(&mut self, total_items: usize) {
        self.total_pages = self.pages_for(total_items);
        self.clamp();
    }

    /// Force `current_page` into `[1, total_pages]`.
    pub fn clamp(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages.max(1));
    }

    /// Advance one page, floored at `total_pages`.
    pub fn next(&mut self) {
        self.current_page = (self.current_page + 1).min(self.total_pages);
    }

    /// Go back one page, floored at 1.
    pub fn previous(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    /// Index range of the current page within the display order.
    #[must_use]
    pub fn bounds(&self) -> (usize, usize) {
        let start = (self.current_page - 1) * self.items_per_page;
        (start, start + self.items_per_page)
    }

    /// Return to page 1 of 1.
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.total_pages = 1;
    }
}
