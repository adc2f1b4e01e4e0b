//! Client-side name filter over the rendered rows.

use crate::view::TableRow;

/// Case-insensitive substring filter on the name column.
///
/// Only ever touches rows already rendered; it never fetches and never
/// changes pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    text: String,
    needle: String,
}

impl SearchFilter {
    /// Create a filter. Empty text matches everything.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let needle = text.to_lowercase();
        Self { text, needle }
    }

    /// The filter text as typed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the filter is inactive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Whether `name` passes the filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.is_empty() || name.to_lowercase().contains(&self.needle)
    }

    /// Show matching rows and hide the rest. Returns how many stay visible.
    pub fn apply(&self, rows: &mut [TableRow]) -> usize {
        let mut visible = 0;
        for row in rows {
            row.visible = self.matches(&row.name);
            visible += usize::from(row.visible);
        }
        visible
    }
}
