//! Data types for Movie Browser
//!
//! This module contains the core data structures shared by the catalog client,
//! the search controller and the favorites store. All types implement Serialize
//! and Deserialize for JSON compatibility with TMDB and Tauri.

use serde::{Deserialize, Serialize};

/// Base URL for poster images at the size used by result cards
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Movie as returned by the TMDB search endpoint
///
/// Read-only once fetched. Fields beyond the ones the UI needs are kept
/// optional so partial payloads still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Unique TMDB identifier
    pub id: u64,
    /// Display title
    pub title: String,
    /// Poster path relative to the image host (e.g. "/abc.jpg")
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Release date as "YYYY-MM-DD"; TMDB sends "" for unknown dates
    #[serde(default)]
    pub release_date: Option<String>,
    /// Plot summary
    #[serde(default)]
    pub overview: Option<String>,
    /// Average vote (0.0 - 10.0)
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// TMDB genre ids
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl Movie {
    /// Create a movie with only the required fields set
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            release_date: None,
            overview: None,
            vote_average: None,
            genre_ids: Vec::new(),
        }
    }

    /// Full poster URL, or `None` when the movie has no poster
    ///
    /// # Example
    /// ```
    /// use movie_browser_core::Movie;
    ///
    /// let mut movie = Movie::new(438631, "Dune");
    /// assert_eq!(movie.poster_url(), None);
    ///
    /// movie.poster_path = Some("/d5NXSklXo0qyIYkgV94XAgMIckC.jpg".to_string());
    /// assert_eq!(
    ///     movie.poster_url().as_deref(),
    ///     Some("https://image.tmdb.org/t/p/w500/d5NXSklXo0qyIYkgV94XAgMIckC.jpg")
    /// );
    /// ```
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", POSTER_BASE_URL, path))
    }

    /// Release year parsed from the leading "YYYY" of the release date
    pub fn release_year(&self) -> Option<u16> {
        let date = self.release_date.as_deref()?.trim();
        let year = date.get(..4)?;
        if !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        year.parse().ok()
    }
}

/// A movie marked as favorite, stamped with the time it was added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteMovie {
    /// The movie as it was when it was added
    #[serde(flatten)]
    pub movie: Movie,
    /// Milliseconds since the Unix epoch
    #[serde(rename = "dateAdded")]
    pub date_added: i64,
}

impl FavoriteMovie {
    /// TMDB identifier of the underlying movie
    pub fn id(&self) -> u64 {
        self.movie.id
    }
}

/// One page of the TMDB movie search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Movies on this page, in catalog order
    #[serde(default)]
    pub results: Vec<Movie>,
    /// Page number (1-based)
    #[serde(default = "first_page")]
    pub page: u32,
    /// Number of pages available for the query
    #[serde(default)]
    pub total_pages: u32,
    /// Number of results available for the query
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl SearchResponse {
    /// The page returned for empty queries and failed requests
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            page: 1,
            total_pages: 0,
            total_results: 0,
        }
    }

    /// Whether another page exists after this one
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// TMDB movie genres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Mystery,
    Romance,
    ScienceFiction,
    TvMovie,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// Every genre, in the order the filter menu lists them
    pub const ALL: [Genre; 19] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Family,
        Genre::Fantasy,
        Genre::History,
        Genre::Horror,
        Genre::Music,
        Genre::Mystery,
        Genre::Romance,
        Genre::ScienceFiction,
        Genre::TvMovie,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    /// TMDB genre id, as sent in `with_genres`
    pub fn id(self) -> u32 {
        match self {
            Genre::Action => 28,
            Genre::Adventure => 12,
            Genre::Animation => 16,
            Genre::Comedy => 35,
            Genre::Crime => 80,
            Genre::Documentary => 99,
            Genre::Drama => 18,
            Genre::Family => 10751,
            Genre::Fantasy => 14,
            Genre::History => 36,
            Genre::Horror => 27,
            Genre::Music => 10402,
            Genre::Mystery => 9648,
            Genre::Romance => 10749,
            Genre::ScienceFiction => 878,
            Genre::TvMovie => 10770,
            Genre::Thriller => 53,
            Genre::War => 10752,
            Genre::Western => 37,
        }
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Family => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::History => "History",
            Genre::Horror => "Horror",
            Genre::Music => "Music",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::ScienceFiction => "Science Fiction",
            Genre::TvMovie => "TV Movie",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }

    /// Look up a genre by its TMDB id
    pub fn from_id(id: u32) -> Option<Genre> {
        Genre::ALL.into_iter().find(|genre| genre.id() == id)
    }
}
