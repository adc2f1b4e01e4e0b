//! Listing, navigation and pagination logic for the bucketview browser.
//!
//! The crate is split along the three responsibilities of the browser plus
//! the pieces that glue them to a renderer:
//!
//! ```text
//! navigation event (open / crumb / next / prev)
//!        |
//!        v
//!  BrowserController  --- FetchTicket --->  ListingSource (HTTP)
//!        |                                        |
//!        |  <------- Result<ListingPage> ---------+
//!        v
//!  windower::compute_window  ->  view::TableRow  ->  search::SearchFilter
//!        |
//!        v
//!  navigator::breadcrumb  ->  ViewState (what the renderer draws)
//! ```
//!
//! Everything except [`fetcher::HttpListingSource`] and
//! [`preferences::PreferenceStore`] is pure and synchronous.

pub mod config;
pub mod controller;
pub mod error;
pub mod fetcher;
pub mod navigator;
pub mod preferences;
pub mod search;
pub mod view;
pub mod windower;

pub use config::BrowserConfig;
pub use controller::{BrowserController, FetchTicket, Outcome, Step, ViewState};
pub use error::{ErrorKind, ListingError, PreferencesError};
pub use fetcher::{HttpListingSource, ListingSource};
