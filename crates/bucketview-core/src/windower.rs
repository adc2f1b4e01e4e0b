//! Page windowing over a loaded listing.
//!
//! Folders, objects and buckets are shown as one sequence in that order. A
//! page is the `[start, end)` slice of the concatenation, so every entry lands
//! on exactly one page and the page count covers all three kinds.

use bucketview_model::{BucketEntry, ObjectEntry, PaginationState};

/// The entries visible on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow<'a> {
    /// Folder prefixes on this page.
    pub displayed_prefixes: &'a [String],
    /// Objects on this page.
    pub displayed_objects: &'a [ObjectEntry],
    /// Buckets on this page.
    pub displayed_buckets: &'a [BucketEntry],
    /// Page the window was cut for, after clamping.
    pub current_page: usize,
    /// Page count for the whole loaded listing.
    pub total_pages: usize,
}

impl PageWindow<'_> {
    /// Number of entries on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.displayed_prefixes.len() + self.displayed_objects.len() + self.displayed_buckets.len()
    }

    /// Whether the page has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cut the window for `state.current_page` out of the loaded entries.
///
/// The requested page is clamped against the recomputed page count, so a
/// stale page number never yields an out-of-range slice.
///
/// # Examples
///
/// ```
/// use bucketview_core::windower::compute_window;
/// use bucketview_model::PaginationState;
///
/// let prefixes: Vec<String> = (0..30).map(|i| format!("d{i}/")).collect();
/// let mut state = PaginationState::new(20);
/// state.current_page = 2;
///
/// let window = compute_window(&prefixes, &[], &[], &state);
/// assert_eq!(window.displayed_prefixes.len(), 10);
/// assert_eq!(window.total_pages, 2);
/// ```
#[must_use]
pub fn compute_window<'a>(
    prefixes: &'a [String],
    objects: &'a [ObjectEntry],
    buckets: &'a [BucketEntry],
    state: &PaginationState,
) -> PageWindow<'a> {
    let mut page = *state;
    page.recompute(prefixes.len() + objects.len() + buckets.len());
    let (start, end) = page.bounds();

    let before_objects = prefixes.len();
    let before_buckets = before_objects + objects.len();

    PageWindow {
        displayed_prefixes: slice(prefixes, start, end),
        displayed_objects: slice(
            objects,
            start.saturating_sub(before_objects),
            end.saturating_sub(before_objects),
        ),
        displayed_buckets: slice(
            buckets,
            start.saturating_sub(before_buckets),
            end.saturating_sub(before_buckets),
        ),
        current_page: page.current_page,
        total_pages: page.total_pages,
    }
}

/// Whether the "next" control is enabled.
///
/// True while loaded pages remain, or when the provider has more results
/// behind `next_token`.
#[must_use]
pub fn has_next(state: &PaginationState, next_token: Option<&str>) -> bool {
    state.current_page < state.total_pages || next_token.is_some()
}

/// Whether the "previous" control is enabled.
#[must_use]
pub fn has_previous(state: &PaginationState) -> bool {
    state.current_page > 1
}

fn slice<T>(items: &[T], start: usize, end: usize) -> &[T] {
    let end = end.min(items.len());
    let start = start.min(end);
    &items[start..end]
}
