//! Search filters
//!
//! [`SearchFilters`] is a value object: the controller compares filters by
//! value and restarts pagination whenever they change.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::types::Genre;

/// Lower bound of the rating range, always sent with every filtered search
pub const RATING_MIN: f32 = 1.0;

/// Upper bound accepted for `rating_max`
pub const RATING_CEILING: f32 = 10.0;

/// Initial position of the rating slider
pub const DEFAULT_RATING_MAX: f32 = 8.0;

/// Filters applied on top of the free-text term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict to one genre
    pub genre: Option<Genre>,
    /// Restrict to a primary release year
    pub year: Option<u16>,
    /// Minimum average vote, fixed at [`RATING_MIN`]
    pub rating_min: f32,
    /// Maximum average vote, within [`RATING_MIN`, `RATING_CEILING`]
    pub rating_max: f32,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            genre: None,
            year: None,
            rating_min: RATING_MIN,
            rating_max: DEFAULT_RATING_MAX,
        }
    }
}

impl SearchFilters {
    /// Copy of these filters with a different genre
    pub fn with_genre(&self, genre: Option<Genre>) -> Self {
        Self {
            genre,
            ..self.clone()
        }
    }

    /// Copy of these filters with a different year
    pub fn with_year(&self, year: Option<u16>) -> Self {
        Self {
            year,
            ..self.clone()
        }
    }

    /// Copy of these filters with a different rating ceiling
    ///
    /// # Errors
    /// `CatalogError::InvalidFilter` if the value is not finite or outside
    /// [`RATING_MIN`, `RATING_CEILING`].
    pub fn with_rating_max(&self, rating_max: f32) -> Result<Self> {
        Ok(Self {
            rating_max: validate_rating_max(rating_max)?,
            ..self.clone()
        })
    }

    /// Query-string pairs for the catalog, omitting unset constraints
    ///
    /// # Example
    /// ```
    /// use movie_browser_core::{Genre, SearchFilters};
    ///
    /// let filters = SearchFilters::default().with_genre(Some(Genre::Drama));
    /// let pairs = filters.query_pairs();
    /// assert!(pairs.contains(&("with_genres", "18".to_string())));
    /// ```
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(year) = self.year {
            pairs.push(("primary_release_year", year.to_string()));
        }
        if let Some(genre) = self.genre {
            pairs.push(("with_genres", genre.id().to_string()));
        }
        // A zero bound means "no bound" for the catalog
        if self.rating_min > 0.0 {
            pairs.push(("vote_average.gte", self.rating_min.to_string()));
        }
        if self.rating_max > 0.0 {
            pairs.push(("vote_average.lte", self.rating_max.to_string()));
        }
        pairs
    }
}

/// Validate a rating ceiling coming from the slider
pub fn validate_rating_max(value: f32) -> Result<f32> {
    if !value.is_finite() || !(RATING_MIN..=RATING_CEILING).contains(&value) {
        return Err(CatalogError::InvalidFilter(format!(
            "rating must be between {} and {}, got {}",
            RATING_MIN, RATING_CEILING, value
        )));
    }
    Ok(value)
}

/// Parse the year text field
///
/// Blank input clears the filter. Anything else must be exactly four digits.
///
/// # Example
/// ```
/// use movie_browser_core::filters::parse_year;
///
/// assert_eq!(parse_year("1999").unwrap(), Some(1999));
/// assert_eq!(parse_year("  ").unwrap(), None);
/// assert!(parse_year("99").is_err());
/// ```
pub fn parse_year(input: &str) -> Result<Option<u16>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let re_year = regex_lite::Regex::new(r"^\d{4}$")
        .map_err(|e| CatalogError::InvalidFilter(format!("year pattern: {}", e)))?;
    if !re_year.is_match(trimmed) {
        return Err(CatalogError::InvalidFilter(format!(
            "year must have 4 digits, got {:?}",
            trimmed
        )));
    }

    trimmed
        .parse()
        .map(Some)
        .map_err(|_| CatalogError::InvalidFilter(format!("invalid year {:?}", trimmed)))
}
