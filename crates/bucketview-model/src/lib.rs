//! Data model for the bucketview listing browser.
//!
//! Every type in this crate is plain data: no I/O, no async. The XML layer
//! produces [`ListingPage`] values, the core crate turns them into
//! [`PaginationState`] and [`BreadcrumbEntry`] trails, and the renderer only
//! ever sees these shapes.

mod breadcrumb;
mod listing;
mod location;
mod pagination;

pub use breadcrumb::BreadcrumbEntry;
pub use listing::{BucketEntry, ListingPage, ListingQuery, ObjectEntry};
pub use location::{DELIMITER, Location};
pub use pagination::{DEFAULT_ITEMS_PER_PAGE, PaginationState};
