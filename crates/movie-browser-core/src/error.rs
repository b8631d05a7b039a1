//! Error types for Movie Browser
//!
//! This module defines all error types used throughout the library.
//! CatalogError implements Serialize for Tauri compatibility.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for Movie Browser operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Catalog answered with an unexpected status code
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Access token was rejected (HTTP 401)
    #[error("Unauthorized - check the TMDB access token")]
    Unauthorized,

    /// Rate limited by the server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Requested resource was not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// A search filter value is out of range
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted data could not be encoded or decoded
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize CatalogError as a string for Tauri compatibility
impl Serialize for CatalogError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for Movie Browser operations
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display_status() {
        let error = CatalogError::Status(503);
        assert_eq!(error.to_string(), "Unexpected HTTP status: 503");
    }

    #[test]
    fn test_catalog_error_display_parse_error() {
        let error = CatalogError::ParseError("missing field `results`".to_string());
        assert_eq!(
            error.to_string(),
            "Failed to parse response: missing field `results`"
        );
    }

    #[test]
    fn test_catalog_error_display_invalid_filter() {
        let error = CatalogError::InvalidFilter("year must have 4 digits".to_string());
        assert_eq!(error.to_string(), "Invalid filter: year must have 4 digits");
    }

    #[test]
    fn test_catalog_error_display_rate_limited() {
        let error = CatalogError::RateLimited;
        assert_eq!(error.to_string(), "Rate limited - too many requests");
    }

    #[test]
    fn test_catalog_error_display_not_found() {
        let error = CatalogError::NotFound("/search/movie".to_string());
        assert_eq!(error.to_string(), "Not found: /search/movie");
    }

    #[test]
    fn test_catalog_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: CatalogError = io.into();
        assert!(matches!(error, CatalogError::Io(_)));
        assert!(error.to_string().contains("denied"));
    }

    #[test]
    fn test_catalog_error_serialize() {
        let error = CatalogError::Config("TMDB_API_READ_ACCESS_TOKEN is not set".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(
            json,
            "\"Configuration error: TMDB_API_READ_ACCESS_TOKEN is not set\""
        );
    }

    #[test]
    fn test_catalog_error_serialize_unauthorized() {
        let error = CatalogError::Unauthorized;
        let json = serde_json::to_string(&error).unwrap();
        assert_eq!(json, "\"Unauthorized - check the TMDB access token\"");
    }
}
