//! Movie Browser Core Library
//!
//! This crate provides the application core of a movie search and favorites
//! browser backed by the TMDB catalog.
//!
//! # Features
//! - Search movies by title with genre, year and rating filters
//! - Debounced input and infinite-scroll pagination
//! - Favorites persisted across sessions
//! - Rate-limited HTTP client with retries

pub mod catalog;
pub mod client;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod pagination;
pub mod storage;
pub mod types;

// Re-export main types for convenience
pub use catalog::{MovieCatalog, TmdbCatalog};
pub use client::{ClientConfig, RateLimiter, TmdbClient};
pub use config::AppConfig;
pub use controller::{DisplayState, FetchRequest, SearchController, SearchSnapshot, SearchState};
pub use error::{CatalogError, Result};
pub use favorites::{FavoritesStore, FAVORITES_KEY};
pub use filters::SearchFilters;
pub use pagination::{PaginationTrigger, SentinelId};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::{FavoriteMovie, Genre, Movie, SearchResponse};
