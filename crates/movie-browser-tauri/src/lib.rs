//! Movie Browser Tauri Integration
//!
//! This crate provides Tauri commands for wiring the Movie Browser core into
//! a Tauri 2.0 application. The webview renders the search page, the favorites
//! page and the sidebar; it sends user intents here and renders the snapshots
//! it gets back.
//!
//! # Usage
//!
//! ```rust,ignore
//! use movie_browser_tauri::AppState;
//! use tauri::Manager;
//!
//! fn main() {
//!     movie_browser_tauri::init_tracing();
//!
//!     tauri::Builder::default()
//!         .setup(|app| {
//!             app.manage(AppState::new()?);
//!             Ok(())
//!         })
//!         .invoke_handler(tauri::generate_handler![
//!             movie_browser_tauri::commands::update_search_term,
//!             movie_browser_tauri::commands::update_rating_max,
//!             movie_browser_tauri::commands::select_genre,
//!             movie_browser_tauri::commands::select_year,
//!             movie_browser_tauri::commands::submit_search,
//!             movie_browser_tauri::commands::sentinel_visible,
//!             movie_browser_tauri::commands::search_snapshot,
//!             movie_browser_tauri::commands::search_page_mounted,
//!             movie_browser_tauri::commands::search_page_unmounted,
//!             movie_browser_tauri::commands::list_genres,
//!             movie_browser_tauri::commands::toggle_favorite,
//!             movie_browser_tauri::commands::is_favorite,
//!             movie_browser_tauri::commands::list_favorites,
//!         ])
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```

pub mod commands;

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_browser_core::{
    AppConfig, CatalogError, FavoriteMovie, FavoritesStore, FetchRequest, FileStore, Genre,
    KeyValueStore, Movie, MovieCatalog, SearchController, SearchSnapshot, SentinelId,
    TmdbCatalog,
};

/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "movie_browser_core=info,movie_browser_tauri=info";

/// Install the global tracing subscriber.
///
/// Returns false if a subscriber was already installed.
pub fn init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Process-wide application state.
///
/// Holds the one search controller and the one favorites store every window
/// surface reads from. Network requests are awaited without holding the
/// controller lock; responses superseded in the meantime are dropped by the
/// controller.
pub struct AppState<C = TmdbCatalog, S = FileStore> {
    controller: Arc<Mutex<SearchController<C>>>,
    favorites: Arc<Mutex<FavoritesStore<S>>>,
}

impl AppState {
    /// Create state from environment configuration.
    ///
    /// # Errors
    /// Returns an error string if configuration, the HTTP client or the
    /// favorites storage cannot be set up.
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::from_env().map_err(|e| e.to_string())?;
        Self::with_config(&config)
    }

    /// Create state from an explicit configuration.
    ///
    /// # Errors
    /// Returns an error string if the HTTP client or the favorites storage
    /// cannot be set up.
    pub fn with_config(config: &AppConfig) -> Result<Self, String> {
        let catalog = TmdbCatalog::new(config.client.clone()).map_err(|e| e.to_string())?;
        let storage = FileStore::open(&config.data_dir).map_err(|e| e.to_string())?;
        let data_dir = storage.dir().to_path_buf();
        let favorites = FavoritesStore::open(storage).map_err(|e| e.to_string())?;

        tracing::info!(
            base_url = %config.client.base_url,
            data_dir = ?data_dir,
            favorites = favorites.len(),
            "movie browser state ready"
        );

        Ok(Self::from_parts(
            SearchController::with_debounce(Arc::new(catalog), config.debounce),
            favorites,
        ))
    }
}

impl<C: MovieCatalog, S: KeyValueStore> AppState<C, S> {
    /// Assemble state from an existing controller and favorites store
    pub fn from_parts(controller: SearchController<C>, favorites: FavoritesStore<S>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            favorites: Arc::new(Mutex::new(favorites)),
        }
    }

    /// Get a reference to the search controller.
    pub fn controller(&self) -> &Arc<Mutex<SearchController<C>>> {
        &self.controller
    }

    /// Get a reference to the favorites store.
    pub fn favorites(&self) -> &Arc<Mutex<FavoritesStore<S>>> {
        &self.favorites
    }

    pub async fn snapshot(&self) -> SearchSnapshot {
        self.controller.lock().await.snapshot()
    }

    /// Search page shown again; returns the sentinel to observe
    pub async fn search_page_mounted(&self) -> SearchSnapshot {
        let mut controller = self.controller.lock().await;
        controller.mount();
        controller.snapshot()
    }

    /// Search page navigated away from; stops sentinel observation
    pub async fn search_page_unmounted(&self) {
        self.controller.lock().await.unmount();
    }

    /// Keystroke in the search box; searches once typing pauses
    pub async fn update_search_term(&self, term: String) -> SearchSnapshot {
        let deadline = self.controller.lock().await.type_term(term);
        sleep_until(deadline).await;
        self.settle().await
    }

    /// Rating slider movement; searches once the slider rests
    pub async fn update_rating_max(&self, value: f32) -> Result<SearchSnapshot, CatalogError> {
        let deadline = self.controller.lock().await.drag_rating_max(value)?;
        sleep_until(deadline).await;
        Ok(self.settle().await)
    }

    pub async fn select_genre(&self, genre_id: Option<u32>) -> Result<SearchSnapshot, CatalogError> {
        let genre = match genre_id {
            Some(id) => Some(
                Genre::from_id(id)
                    .ok_or_else(|| CatalogError::InvalidFilter(format!("unknown genre id {}", id)))?,
            ),
            None => None,
        };

        let request = {
            let mut controller = self.controller.lock().await;
            if !controller.select_genre(genre) {
                return Ok(controller.snapshot());
            }
            controller.begin_fetch()
        };
        Ok(self.run(request).await)
    }

    pub async fn select_year(&self, year: String) -> Result<SearchSnapshot, CatalogError> {
        let request = {
            let mut controller = self.controller.lock().await;
            if !controller.select_year(&year)? {
                return Ok(controller.snapshot());
            }
            controller.begin_fetch()
        };
        Ok(self.run(request).await)
    }

    /// Search button or Enter
    pub async fn submit_search(&self) -> SearchSnapshot {
        let request = {
            let mut controller = self.controller.lock().await;
            if !controller.submit() {
                return controller.snapshot();
            }
            controller.begin_fetch()
        };
        self.run(request).await
    }

    /// Visibility report for the infinite-scroll sentinel
    pub async fn sentinel_visible(&self, sentinel: SentinelId, ratio: f32) -> SearchSnapshot {
        let request = {
            let mut controller = self.controller.lock().await;
            match controller.on_sentinel_visible(sentinel, ratio) {
                Some(request) => request,
                None => return controller.snapshot(),
            }
        };
        self.run(request).await
    }

    pub async fn toggle_favorite(&self, movie: &Movie) -> Result<bool, CatalogError> {
        self.favorites.lock().await.toggle_favorite(movie)
    }

    pub async fn is_favorite(&self, id: u64) -> bool {
        self.favorites.lock().await.is_favorite(id)
    }

    pub async fn list_favorites(&self) -> Vec<FavoriteMovie> {
        self.favorites.lock().await.favorites().to_vec()
    }

    /// Commit settled inputs and fetch if pagination was reset
    async fn settle(&self) -> SearchSnapshot {
        let request = {
            let mut controller = self.controller.lock().await;
            if !controller.settle_inputs(Instant::now()) {
                return controller.snapshot();
            }
            controller.begin_fetch()
        };
        self.run(request).await
    }

    async fn run(&self, request: FetchRequest) -> SearchSnapshot {
        let catalog = self.controller.lock().await.catalog();
        let response = catalog
            .search(&request.term, request.page, &request.filters)
            .await;

        let mut controller = self.controller.lock().await;
        controller.apply_response(&request, response);
        controller.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use movie_browser_core::{DisplayState, MemoryStore, SearchFilters, SearchResponse};
    use std::sync::Mutex as StdMutex;

    /// Catalog with two pages for "dune" and nothing else
    #[derive(Default)]
    struct StubCatalog {
        calls: StdMutex<Vec<(String, u32)>>,
    }

    #[async_trait]
    impl MovieCatalog for StubCatalog {
        async fn search(&self, term: &str, page: u32, _filters: &SearchFilters) -> SearchResponse {
            self.calls.lock().unwrap().push((term.to_string(), page));
            if term != "dune" {
                return SearchResponse::empty();
            }
            let count = if page == 1 { 20 } else { 5 };
            SearchResponse {
                results: (0..count)
                    .map(|i| Movie::new(page as u64 * 100 + i, "Dune"))
                    .collect(),
                page,
                total_pages: 2,
                total_results: 25,
            }
        }
    }

    fn state() -> (Arc<StubCatalog>, AppState<StubCatalog, MemoryStore>) {
        let catalog = Arc::new(StubCatalog::default());
        let controller = SearchController::new(Arc::clone(&catalog));
        let favorites = FavoritesStore::open(MemoryStore::new()).unwrap();
        (catalog, AppState::from_parts(controller, favorites))
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_then_scroll() {
        let (catalog, state) = state();

        let snapshot = state.update_search_term("dune".to_string()).await;
        assert_eq!(snapshot.movies.len(), 20);
        assert_eq!(snapshot.display, DisplayState::Loaded);

        let sentinel = snapshot.sentinel.expect("sentinel should be rendered");
        let snapshot = state.sentinel_visible(sentinel, 1.0).await;
        assert_eq!(snapshot.movies.len(), 25);
        assert!(!snapshot.has_more);
        assert_eq!(snapshot.sentinel, None);

        assert_eq!(
            *catalog.calls.lock().unwrap(),
            vec![("dune".to_string(), 1), ("dune".to_string(), 2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_keystroke_does_not_fetch() {
        let (catalog, state) = state();

        state.controller().lock().await.type_term("du");
        let snapshot = state.update_search_term("dune".to_string()).await;

        assert_eq!(snapshot.term, "dune");
        assert_eq!(*catalog.calls.lock().unwrap(), vec![("dune".to_string(), 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmounted_page_ignores_sentinel() {
        let (catalog, state) = state();

        let snapshot = state.update_search_term("dune".to_string()).await;
        let old = snapshot.sentinel.expect("sentinel should be rendered");

        state.search_page_unmounted().await;
        let snapshot = state.sentinel_visible(old, 1.0).await;
        assert_eq!(snapshot.page, 1);
        assert_eq!(snapshot.sentinel, None);
        assert_eq!(catalog.calls.lock().unwrap().len(), 1);

        let snapshot = state.search_page_mounted().await;
        let fresh = snapshot.sentinel.expect("mount renders a sentinel");
        assert_ne!(fresh, old);
        let snapshot = state.sentinel_visible(fresh, 1.0).await;
        assert_eq!(snapshot.movies.len(), 25);
    }

    #[tokio::test]
    async fn test_unknown_genre_is_rejected() {
        let (_, state) = state();
        let result = state.select_genre(Some(1)).await;
        assert!(matches!(result, Err(CatalogError::InvalidFilter(_))));
    }

    #[tokio::test]
    async fn test_genre_selection_fetches_immediately() {
        let (catalog, state) = state();
        state.controller().lock().await.set_term("dune");

        let snapshot = state.select_genre(Some(878)).await.unwrap();
        assert_eq!(snapshot.filters.genre, Some(Genre::ScienceFiction));
        assert_eq!(snapshot.movies.len(), 20);
        assert_eq!(catalog.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_year_is_rejected() {
        let (_, state) = state();
        assert!(state.select_year("nineteen".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn test_favorites_are_shared() {
        let (_, state) = state();
        let movie = Movie::new(42, "The Answer");

        assert!(state.toggle_favorite(&movie).await.unwrap());
        assert!(state.is_favorite(42).await);
        assert_eq!(state.list_favorites().await.len(), 1);

        assert!(!state.toggle_favorite(&movie).await.unwrap());
        assert!(state.list_favorites().await.is_empty());
    }

    #[test]
    fn test_init_tracing_only_once() {
        let first = init_tracing();
        let second = init_tracing();
        assert!(!second || !first);
    }
}
