//! The browser state machine.
//!
//! [`BrowserController`] owns everything the browser knows: the committed
//! location, the listing loaded for it, pagination, the active filter and the
//! [`ViewState`] a renderer draws. Every network round trip is split in two:
//!
//! 1. a `begin_*` call that hands out a [`FetchTicket`] stamped with a fresh
//!    generation and marks the view as loading;
//! 2. [`BrowserController::complete`] that applies the response, or drops it
//!    when a newer ticket has been issued since.
//!
//! Committed state only changes when a response is applied, so a failed
//! request leaves the previous table in place and fully usable. The async
//! drivers (`navigate`, `next_page`, ...) run both halves against a
//! [`ListingSource`] for callers that do not need to interleave requests.

use serde::Serialize;
use tracing::{debug, info, warn};

use bucketview_model::{BreadcrumbEntry, ListingPage, ListingQuery, Location, PaginationState};

use crate::config::BrowserConfig;
use crate::error::ListingError;
use crate::fetcher::ListingSource;
use crate::navigator::{breadcrumb, crumb_target, home_url};
use crate::search::SearchFilter;
use crate::view::{TableRow, build_rows};
use crate::windower::{compute_window, has_next, has_previous};

/// Which page to show once a response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    /// This page, clamped to what is loaded.
    Page(usize),
    /// The page holding the first entry the response added.
    FirstAppended,
}

/// One outstanding listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    location: Location,
    query: ListingQuery,
    landing: Landing,
    continuation: bool,
}

impl FetchTicket {
    /// The request to send.
    #[must_use]
    pub fn query(&self) -> &ListingQuery {
        &self.query
    }

    /// Generation this ticket was issued under.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the response extends the current listing.
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        self.continuation
    }
}

/// What advancing a page requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The page was already loaded and is now shown.
    Local,
    /// More entries must be fetched first.
    Fetch(FetchTicket),
    /// Already on the last page with nothing left to fetch.
    None,
}

/// Result of applying a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response was rendered.
    Applied,
    /// The request failed; the error banner is set.
    Failed,
    /// A newer request superseded this one; nothing changed.
    Stale,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Location the table shows.
    pub location: Location,
    /// Breadcrumb trail for `location`.
    pub breadcrumb: Vec<BreadcrumbEntry>,
    /// Link behind the fixed "Home" crumb.
    pub home_url: String,
    /// Rows of the current page, hidden ones included.
    pub rows: Vec<TableRow>,
    /// Page indicator.
    pub page: PaginationState,
    /// A request is in flight.
    pub loading: bool,
    /// Error banner text.
    pub error: Option<String>,
    /// "next" control enabled.
    pub has_next: bool,
    /// "previous" control enabled.
    pub has_previous: bool,
    /// Active filter text.
    pub filter: String,
}

impl ViewState {
    /// Rows not hidden by the filter.
    pub fn visible_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|row| row.visible)
    }
}

/// Owns browsing state and turns navigation events into listing requests.
#[derive(Debug)]
pub struct BrowserController {
    endpoint: String,
    location: Location,
    listing: ListingPage,
    pagination: PaginationState,
    filter: SearchFilter,
    generation: u64,
    restore_page: Option<usize>,
    view: ViewState,
}

impl BrowserController {
    /// Controller positioned at `location` with nothing loaded yet.
    #[must_use]
    pub fn new(config: &BrowserConfig, location: Location) -> Self {
        let pagination = PaginationState::new(config.items_per_page);
        let mut controller = Self {
            endpoint: config.endpoint_base().to_owned(),
            listing: ListingPage::default(),
            pagination,
            filter: SearchFilter::default(),
            generation: 0,
            restore_page: None,
            view: ViewState {
                location: location.clone(),
                breadcrumb: Vec::new(),
                home_url: home_url(config.endpoint_base()),
                rows: Vec::new(),
                page: pagination,
                loading: false,
                error: None,
                has_next: false,
                has_previous: false,
                filter: String::new(),
            },
            location,
        };
        controller.render();
        controller
    }

    /// What to draw.
    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Committed location.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Everything loaded for the committed location so far.
    #[must_use]
    pub fn listing(&self) -> &ListingPage {
        &self.listing
    }

    /// Latest issued generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start loading `location` from its first page.
    pub fn begin_navigate(&mut self, location: Location) -> FetchTicket {
        self.issue(location, 1)
    }

    /// Start reloading the committed location, keeping the current page.
    ///
    /// The reload starts from the first remote page. When the page being
    /// kept lies beyond it, [`Self::begin_restore`] hands out the
    /// continuation requests that load the rest.
    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.issue(self.location.clone(), self.pagination.current_page)
    }

    /// Next continuation request needed to get back to the page a refresh
    /// kept. `None` once that page is loaded or nothing more can be fetched.
    pub fn begin_restore(&mut self) -> Option<FetchTicket> {
        let page = self.restore_page.take()?;
        self.issue_continuation(Landing::Page(page))
    }

    /// Advance one page, fetching the next remote page when needed.
    ///
    /// A fetched continuation lands on the page holding its first entry,
    /// which is the current page again while that page is not yet full.
    pub fn begin_next(&mut self) -> Step {
        if self.pagination.current_page < self.pagination.total_pages {
            self.pagination.next();
            self.render();
            return Step::Local;
        }

        match self.issue_continuation(Landing::FirstAppended) {
            Some(ticket) => Step::Fetch(ticket),
            None => Step::None,
        }
    }

    /// Go back one page. Always local.
    pub fn previous(&mut self) -> bool {
        if !has_previous(&self.pagination) {
            return false;
        }
        self.pagination.previous();
        self.render();
        true
    }

    /// Jump to an already loaded page, clamped to the loaded range.
    pub fn go_to_page(&mut self, page: usize) {
        self.pagination.current_page = page;
        self.render();
    }

    /// Apply the response for `ticket`.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<ListingPage, ListingError>,
    ) -> Outcome {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                latest = self.generation,
                "discarding superseded listing response"
            );
            return Outcome::Stale;
        }

        self.view.loading = false;

        match result {
            Ok(page) => {
                let target = match ticket.landing {
                    Landing::Page(n) => n,
                    Landing::FirstAppended => first_appended(&self.listing, &page).map_or(
                        self.pagination.current_page,
                        |index| index / self.pagination.items_per_page.max(1) + 1,
                    ),
                };
                if ticket.continuation {
                    self.listing.extend(page);
                } else {
                    self.location = ticket.location;
                    self.listing = page;
                    self.pagination.reset();
                }
                self.pagination.current_page = target;
                self.view.error = None;
                self.render();
                self.restore_page = (self.pagination.current_page < target
                    && self.listing.next_continuation_token.is_some())
                .then_some(target);
                info!(
                    location = %self.location,
                    entries = self.listing.len(),
                    page = self.pagination.current_page,
                    total_pages = self.pagination.total_pages,
                    "listing loaded"
                );
                Outcome::Applied
            }
            Err(err) => {
                warn!(
                    location = %ticket.location,
                    kind = %err.kind(),
                    error = %err,
                    "listing request failed"
                );
                self.view.error = Some(err.banner());
                self.restore_page = None;
                Outcome::Failed
            }
        }
    }

    /// Filter the rendered rows by name. Never fetches.
    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = SearchFilter::new(text);
        self.filter.apply(&mut self.view.rows);
        self.view.filter = self.filter.text().to_owned();
    }

    /// Where "up" leads: the parent folder, or the storage root from a
    /// bucket root. `None` at the storage root.
    #[must_use]
    pub fn parent_location(&self) -> Option<Location> {
        if self.location.is_storage_root() {
            return None;
        }
        Some(self.location.parent().unwrap_or_default())
    }

    /// Load `location` from its first page.
    pub async fn navigate<S>(&mut self, source: &S, location: Location) -> Outcome
    where
        S: ListingSource + ?Sized,
    {
        let ticket = self.begin_navigate(location);
        self.run(source, ticket).await
    }

    /// Reload the committed location, following continuation tokens until
    /// the current page is loaded again.
    pub async fn refresh<S>(&mut self, source: &S) -> Outcome
    where
        S: ListingSource + ?Sized,
    {
        let ticket = self.begin_refresh();
        let mut outcome = self.run(source, ticket).await;
        while let Some(ticket) = self.begin_restore() {
            outcome = self.run(source, ticket).await;
        }
        outcome
    }

    /// Advance one page. `None` when there is no next page.
    pub async fn next_page<S>(&mut self, source: &S) -> Option<Outcome>
    where
        S: ListingSource + ?Sized,
    {
        match self.begin_next() {
            Step::Local => Some(Outcome::Applied),
            Step::Fetch(ticket) => Some(self.run(source, ticket).await),
            Step::None => None,
        }
    }

    /// Open the `index`th visible row. `None` when it is not a folder or
    /// bucket, or out of range.
    pub async fn open_row<S>(&mut self, source: &S, index: usize) -> Option<Outcome>
    where
        S: ListingSource + ?Sized,
    {
        let target = self
            .view
            .visible_rows()
            .nth(index)
            .and_then(|row| row.target.location())
            .cloned()?;
        Some(self.navigate(source, target).await)
    }

    /// Follow the `index`th breadcrumb entry. `None` for the current one.
    pub async fn open_breadcrumb<S>(&mut self, source: &S, index: usize) -> Option<Outcome>
    where
        S: ListingSource + ?Sized,
    {
        let target = self
            .view
            .breadcrumb
            .get(index)
            .and_then(|entry| crumb_target(&self.location, entry))?;
        Some(self.navigate(source, target).await)
    }

    /// Go to the storage root.
    pub async fn open_home<S>(&mut self, source: &S) -> Outcome
    where
        S: ListingSource + ?Sized,
    {
        self.navigate(source, Location::default()).await
    }

    /// Go up one level.
    pub async fn up<S>(&mut self, source: &S) -> Option<Outcome>
    where
        S: ListingSource + ?Sized,
    {
        let target = self.parent_location()?;
        Some(self.navigate(source, target).await)
    }

    async fn run<S>(&mut self, source: &S, ticket: FetchTicket) -> Outcome
    where
        S: ListingSource + ?Sized,
    {
        let result = source.fetch(ticket.query()).await;
        self.complete(ticket, result)
    }

    fn issue(&mut self, location: Location, page: usize) -> FetchTicket {
        self.generation += 1;
        self.restore_page = None;
        self.start_loading();
        debug!(generation = self.generation, %location, "fetching listing");
        FetchTicket {
            generation: self.generation,
            query: ListingQuery::for_location(&location),
            location,
            landing: Landing::Page(page),
            continuation: false,
        }
    }

    fn issue_continuation(&mut self, landing: Landing) -> Option<FetchTicket> {
        let token = self.listing.next_continuation_token.clone()?;
        self.generation += 1;
        self.restore_page = None;
        self.start_loading();
        debug!(
            generation = self.generation,
            location = %self.location,
            "fetching continuation"
        );
        Some(FetchTicket {
            generation: self.generation,
            query: ListingQuery::continue_from(&self.location, token),
            location: self.location.clone(),
            landing,
            continuation: true,
        })
    }

    fn start_loading(&mut self) {
        self.view.loading = true;
        self.view.error = None;
    }

    fn render(&mut self) {
        let window = compute_window(
            &self.listing.prefixes,
            &self.listing.objects,
            &self.listing.buckets,
            &self.pagination,
        );
        self.pagination.current_page = window.current_page;
        self.pagination.total_pages = window.total_pages;

        let mut rows = build_rows(&window, &self.location, &self.endpoint);
        self.filter.apply(&mut rows);

        self.view.location = self.location.clone();
        self.view.breadcrumb = breadcrumb(&self.location);
        self.view.rows = rows;
        self.view.page = self.pagination;
        self.view.has_next = has_next(
            &self.pagination,
            self.listing.next_continuation_token.as_deref(),
        );
        self.view.has_previous = has_previous(&self.pagination);
        self.view.filter = self.filter.text().to_owned();
    }
}

/// Display index of the first entry `next` adds to `listing`.
///
/// Rows are ordered prefixes, objects, buckets, so appended prefixes land
/// right after the loaded prefixes, ahead of every loaded object.
fn first_appended(listing: &ListingPage, next: &ListingPage) -> Option<usize> {
    if !next.prefixes.is_empty() {
        Some(listing.prefixes.len())
    } else if !next.objects.is_empty() {
        Some(listing.prefixes.len() + listing.objects.len())
    } else if !next.buckets.is_empty() {
        Some(listing.len())
    } else {
        None
    }
}
