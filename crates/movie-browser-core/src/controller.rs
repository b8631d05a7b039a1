//! Search controller
//!
//! [`SearchController`] owns the page state of a search session: the term,
//! the filters, the page counter and the accumulated results. It decides when
//! pagination restarts (new term or filters) and when a page is appended
//! (infinite scroll), debounces text entry and the rating slider, and drives
//! the [`MovieCatalog`] fetches.
//!
//! A fetch is split in two steps, [`SearchController::begin_fetch`] and
//! [`SearchController::apply_response`], so callers can await the network
//! without holding the controller. Every reset bumps a generation counter and
//! responses issued under an older generation are discarded.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::catalog::MovieCatalog;
use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::error::Result;
use crate::filters::{parse_year, validate_rating_max, SearchFilters};
use crate::pagination::{PaginationTrigger, SentinelId};
use crate::types::{Genre, Movie, SearchResponse};

/// What the results area should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayState {
    /// Nothing searched yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// Results are available
    Loaded,
    /// A search completed with zero results (or failed)
    Empty,
}

/// Page state of the current search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    pub term: String,
    pub filters: SearchFilters,
    /// Current page (1-based)
    pub page: u32,
    /// Results of pages 1..=page in arrival order; not deduplicated
    pub movies: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u32,
    pub is_loading: bool,
    pub has_more: bool,
    pub has_searched: bool,
    /// Bumped on every reset
    pub generation: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            term: String::new(),
            filters: SearchFilters::default(),
            page: 1,
            movies: Vec::new(),
            total_pages: 0,
            total_results: 0,
            is_loading: false,
            has_more: false,
            has_searched: false,
            generation: 0,
        }
    }
}

impl SearchState {
    pub fn display_state(&self) -> DisplayState {
        if self.is_loading {
            DisplayState::Loading
        } else if !self.movies.is_empty() {
            DisplayState::Loaded
        } else if self.has_searched && self.total_results == 0 {
            DisplayState::Empty
        } else {
            DisplayState::Idle
        }
    }
}

/// A fetch that has been started and awaits its response
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub term: String,
    pub filters: SearchFilters,
    pub page: u32,
    pub generation: u64,
}

/// Read-only projection handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    pub term: String,
    pub filters: SearchFilters,
    pub page: u32,
    pub movies: Vec<Movie>,
    pub total_results: u32,
    pub is_loading: bool,
    pub has_more: bool,
    pub has_searched: bool,
    pub display: DisplayState,
    /// Sentinel to render after the last card, if any
    pub sentinel: Option<SentinelId>,
}

/// Search, filter and infinite-scroll state machine
pub struct SearchController<C> {
    catalog: Arc<C>,
    state: SearchState,
    term_input: Debouncer<String>,
    rating_input: Debouncer<f32>,
    trigger: PaginationTrigger,
    /// Whether the search page, and so the sentinel, is on screen
    mounted: bool,
}

impl<C: MovieCatalog> SearchController<C> {
    /// Create a controller with the default 300 ms debounce window
    pub fn new(catalog: Arc<C>) -> Self {
        Self::with_debounce(catalog, DEFAULT_DEBOUNCE)
    }

    /// Create a controller with a custom debounce window
    pub fn with_debounce(catalog: Arc<C>, window: Duration) -> Self {
        let mut controller = Self {
            catalog,
            state: SearchState::default(),
            term_input: Debouncer::new(window),
            rating_input: Debouncer::new(window),
            trigger: PaginationTrigger::default(),
            mounted: true,
        };
        controller.sync_trigger();
        controller
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn catalog(&self) -> Arc<C> {
        Arc::clone(&self.catalog)
    }

    pub fn display_state(&self) -> DisplayState {
        self.state.display_state()
    }

    /// Sentinel currently rendered and observed
    pub fn sentinel(&self) -> Option<SentinelId> {
        self.trigger.sentinel()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            term: self.state.term.clone(),
            filters: self.state.filters.clone(),
            page: self.state.page,
            movies: self.state.movies.clone(),
            total_results: self.state.total_results,
            is_loading: self.state.is_loading,
            has_more: self.state.has_more,
            has_searched: self.state.has_searched,
            display: self.display_state(),
            sentinel: self.sentinel(),
        }
    }

    /// Search page left the screen: stop observing the sentinel.
    ///
    /// Visibility reports for the old sentinel are ignored until
    /// [`SearchController::mount`] is called again.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.trigger.teardown();
        tracing::debug!("search page unmounted, sentinel observation stopped");
    }

    /// Search page back on screen: observe a fresh sentinel if one is due
    pub fn mount(&mut self) {
        self.mounted = true;
        self.sync_trigger();
    }

    /// Replace the term immediately. Returns true if pagination was reset.
    pub fn set_term(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term == self.state.term {
            return false;
        }
        self.state.term = term;
        self.reset();
        true
    }

    /// Replace the filters wholesale. Returns true if pagination was reset.
    pub fn apply_filters(&mut self, filters: SearchFilters) -> bool {
        if filters == self.state.filters {
            return false;
        }
        self.state.filters = filters;
        self.reset();
        true
    }

    /// Genre menu selection, applied immediately
    pub fn select_genre(&mut self, genre: Option<Genre>) -> bool {
        let filters = self.state.filters.with_genre(genre);
        self.apply_filters(filters)
    }

    /// Year field confirmation, applied immediately. Blank input clears it.
    ///
    /// # Errors
    /// `CatalogError::InvalidFilter` if the input is not a 4-digit year.
    pub fn select_year(&mut self, input: &str) -> Result<bool> {
        let year = parse_year(input)?;
        let filters = self.state.filters.with_year(year);
        Ok(self.apply_filters(filters))
    }

    /// Keystroke in the search box. Returns when the value settles.
    pub fn type_term(&mut self, text: impl Into<String>) -> Instant {
        self.term_input.push(text.into())
    }

    /// Rating slider movement. Returns when the value settles.
    ///
    /// # Errors
    /// `CatalogError::InvalidFilter` if the value is outside [1, 10].
    pub fn drag_rating_max(&mut self, value: f32) -> Result<Instant> {
        let value = validate_rating_max(value)?;
        Ok(self.rating_input.push(value))
    }

    /// Earliest instant at which a debounced input settles
    pub fn pending_deadline(&self) -> Option<Instant> {
        match (self.term_input.deadline(), self.rating_input.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Commit debounced inputs whose window has elapsed at `now`.
    ///
    /// Returns true if pagination was reset and a fetch is due.
    pub fn settle_inputs(&mut self, now: Instant) -> bool {
        let mut reset = false;
        if let Some(term) = self.term_input.poll_ready(now) {
            reset |= self.set_term(term);
        }
        if let Some(rating_max) = self.rating_input.poll_ready(now) {
            let filters = SearchFilters {
                rating_max,
                ..self.state.filters.clone()
            };
            reset |= self.apply_filters(filters);
        }
        reset
    }

    /// Search button / Enter: commit the pending term now and restart at page 1.
    ///
    /// Returns true if a fetch is due.
    pub fn submit(&mut self) -> bool {
        if let Some(term) = self.term_input.flush() {
            if self.set_term(term) {
                return true;
            }
        }
        if self.state.page > 1 {
            self.reset();
            return true;
        }
        false
    }

    /// Advance to the next page and start its fetch.
    ///
    /// Returns `None` while a fetch is in flight, when no page is left, or
    /// before the first page of the current search has arrived.
    pub fn next_page(&mut self) -> Option<FetchRequest> {
        if self.state.is_loading || !self.state.has_more || self.state.total_pages == 0 {
            return None;
        }
        self.state.page += 1;
        Some(self.begin_fetch())
    }

    /// Visibility report for a sentinel.
    ///
    /// Starts the next page fetch when the live sentinel is fully visible.
    pub fn on_sentinel_visible(&mut self, sentinel: SentinelId, ratio: f32) -> Option<FetchRequest> {
        if !self
            .trigger
            .on_visibility(sentinel, ratio, self.state.is_loading)
        {
            return None;
        }
        self.next_page()
    }

    /// Mark the current page as in flight
    pub fn begin_fetch(&mut self) -> FetchRequest {
        self.state.is_loading = true;
        self.sync_trigger();

        tracing::debug!(
            term = %self.state.term,
            page = self.state.page,
            generation = self.state.generation,
            "search fetch started"
        );

        FetchRequest {
            term: self.state.term.clone(),
            filters: self.state.filters.clone(),
            page: self.state.page,
            generation: self.state.generation,
        }
    }

    /// Merge a response into the page state.
    ///
    /// Page 1 replaces the results, later pages append. Returns false when the
    /// response belongs to a superseded request and was discarded.
    pub fn apply_response(&mut self, request: &FetchRequest, response: SearchResponse) -> bool {
        if request.generation != self.state.generation || request.page != self.state.page {
            tracing::debug!(
                request_generation = request.generation,
                generation = self.state.generation,
                request_page = request.page,
                page = self.state.page,
                "discarding stale search response"
            );
            return false;
        }

        if request.page <= 1 {
            self.state.movies = response.results;
            self.state.has_searched = !request.term.trim().is_empty();
        } else {
            self.state.movies.extend(response.results);
        }
        self.state.total_pages = response.total_pages;
        self.state.total_results = response.total_results;
        self.state.has_more = request.page < response.total_pages;
        self.state.is_loading = false;
        self.sync_trigger();

        tracing::debug!(
            page = request.page,
            movies = self.state.movies.len(),
            has_more = self.state.has_more,
            "search fetch applied"
        );
        true
    }

    /// Run a started request against the catalog and apply its response
    pub async fn execute(&mut self, request: FetchRequest) -> bool {
        let response = self
            .catalog
            .search(&request.term, request.page, &request.filters)
            .await;
        self.apply_response(&request, response)
    }

    /// Fetch the current page
    pub async fn fetch(&mut self) -> bool {
        let request = self.begin_fetch();
        self.execute(request).await
    }

    /// Advance to and fetch the next page, if allowed
    pub async fn load_next_page(&mut self) -> bool {
        match self.next_page() {
            Some(request) => self.execute(request).await,
            None => false,
        }
    }

    fn reset(&mut self) {
        self.state.page = 1;
        self.state.movies.clear();
        self.state.total_pages = 0;
        self.state.total_results = 0;
        self.state.has_more = true;
        self.state.has_searched = false;
        // Any in-flight response is now stale
        self.state.is_loading = false;
        self.state.generation += 1;
        // Sentinels issued for the previous search must not page this one
        self.trigger.teardown();
        self.sync_trigger();

        tracing::debug!(
            term = %self.state.term,
            generation = self.state.generation,
            "search reset"
        );
    }

    fn sync_trigger(&mut self) {
        if !self.mounted {
            return;
        }
        self.trigger
            .sync(self.state.has_more, self.state.is_loading);
    }
}
