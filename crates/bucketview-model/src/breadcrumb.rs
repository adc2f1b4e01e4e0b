//! Breadcrumb trail entries.

use serde::{Deserialize, Serialize};

/// One step of the breadcrumb trail.
///
/// `path` is the folder prefix to navigate to; the entry for the current
/// folder has no path and is rendered as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbEntry {
    /// Segment text.
    pub label: String,
    /// Navigation target, `None` for the current position.
    pub path: Option<String>,
}

impl BreadcrumbEntry {
    /// Whether clicking this entry navigates somewhere.
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        self.path.is_some()
    }
}
