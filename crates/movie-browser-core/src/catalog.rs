//! Movie catalog API
//!
//! This module provides the high-level search API over TMDB. It combines the
//! HTTP client with query building, and exposes the [`MovieCatalog`] seam the
//! search controller depends on.

use async_trait::async_trait;

use crate::client::{ClientConfig, TmdbClient};
use crate::error::Result;
use crate::filters::SearchFilters;
use crate::types::SearchResponse;

/// Source of paginated movie search results
///
/// `search` never fails: implementations report problems through logging
/// and return [`SearchResponse::empty`] instead. Callers therefore cannot tell
/// "no results" from "request failed" by the return value.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch one page of results for `term` and `filters`
    async fn search(&self, term: &str, page: u32, filters: &SearchFilters) -> SearchResponse;
}

/// Build the request path for a movie search.
///
/// The term is trimmed and percent-encoded; filter constraints that are not
/// set are left out so the catalog defaults apply.
///
/// # Example
/// ```
/// use movie_browser_core::catalog::build_search_path;
/// use movie_browser_core::SearchFilters;
///
/// let path = build_search_path("star wars", 2, &SearchFilters::default());
/// assert_eq!(
///     path,
///     "/search/movie?query=star%20wars&page=2&vote_average.gte=1&vote_average.lte=8"
/// );
/// ```
pub fn build_search_path(term: &str, page: u32, filters: &SearchFilters) -> String {
    let mut path = format!(
        "/search/movie?query={}&page={}",
        urlencoding::encode(term.trim()),
        page
    );
    for (key, value) in filters.query_pairs() {
        path.push('&');
        path.push_str(key);
        path.push('=');
        path.push_str(&urlencoding::encode(&value));
    }
    path
}

/// TMDB-backed movie catalog
///
/// # Example
/// ```no_run
/// use movie_browser_core::{ClientConfig, MovieCatalog, SearchFilters, TmdbCatalog};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let catalog = TmdbCatalog::new(ClientConfig {
///         access_token: "your-read-access-token".to_string(),
///         ..ClientConfig::default()
///     })?;
///
///     let page = catalog.search("Dune", 1, &SearchFilters::default()).await;
///     println!("Found {} movies", page.total_results);
///     Ok(())
/// }
/// ```
pub struct TmdbCatalog {
    client: TmdbClient,
}

impl TmdbCatalog {
    /// Create a catalog with the given client configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            client: TmdbClient::new(config)?,
        })
    }

    /// Search movies, propagating failures.
    ///
    /// An empty or whitespace-only term returns [`SearchResponse::empty`]
    /// without touching the network.
    ///
    /// # Arguments
    /// * `term` - Free-text query
    /// * `page` - Page number (1-based)
    /// * `filters` - Genre, year and rating constraints
    ///
    /// # Errors
    /// Any error from [`TmdbClient::get_json`].
    pub async fn search_page(
        &self,
        term: &str,
        page: u32,
        filters: &SearchFilters,
    ) -> Result<SearchResponse> {
        if term.trim().is_empty() {
            return Ok(SearchResponse::empty());
        }

        let page = page.max(1);
        let path = build_search_path(term, page, filters);
        let mut response: SearchResponse = self.client.get_json(&path).await?;

        // Ensure page reflects the request
        response.page = page;

        tracing::debug!(
            term = term.trim(),
            page,
            results = response.results.len(),
            total_pages = response.total_pages,
            "movie search completed"
        );
        Ok(response)
    }
}

#[async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn search(&self, term: &str, page: u32, filters: &SearchFilters) -> SearchResponse {
        match self.search_page(term, page, filters).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, term = term.trim(), page, "movie search failed");
                SearchResponse::empty()
            }
        }
    }
}
