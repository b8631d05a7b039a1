//! HTTP client with rate limiting for the TMDB API
//!
//! This module provides a rate-limited, bearer-authenticated HTTP client that
//! decodes JSON responses and retries transient errors with exponential backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{CatalogError, Result};

/// Base URL for TMDB API v3
pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default maximum number of retry attempts for transient errors
const MAX_RETRIES: u32 = 3;

/// Default base delay for exponential backoff (in milliseconds)
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Rate limiter to control request frequency
///
/// Ensures that requests are spaced at least `min_interval` apart.
pub struct RateLimiter {
    /// Minimum interval between requests
    min_interval: Duration,
    /// Timestamp of the last request
    last_request: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// # Errors
    /// `CatalogError::Config` unless the rate is finite, positive, and large
    /// enough for its interval to fit in a `Duration`.
    ///
    /// # Example
    /// ```
    /// use movie_browser_core::client::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(20.0).unwrap();
    /// assert_eq!(limiter.min_interval().as_millis(), 50);
    /// assert!(RateLimiter::new(0.0).is_err());
    /// ```
    pub fn new(requests_per_second: f64) -> Result<Self> {
        let invalid = || {
            CatalogError::Config(format!(
                "requests per second must be a positive number, got {}",
                requests_per_second
            ))
        };
        if !(requests_per_second.is_finite() && requests_per_second > 0.0) {
            return Err(invalid());
        }
        let min_interval =
            Duration::try_from_secs_f64(1.0 / requests_per_second).map_err(|_| invalid())?;

        let now = Instant::now();
        Ok(Self {
            min_interval,
            last_request: Arc::new(Mutex::new(
                now.checked_sub(min_interval).unwrap_or(now),
            )),
        })
    }

    /// Acquire permission to make a request
    ///
    /// Waits if necessary so that the minimum interval between requests is respected.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }

        *last = Instant::now();
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Configuration for the TMDB HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL without trailing slash
    pub base_url: String,
    /// API read access token, sent as a bearer token
    pub access_token: String,
    /// Maximum requests per second (default: 20.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Retries on 429/5xx before giving up (default: 3)
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry (default: 1000)
    pub retry_base_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: TMDB_BASE_URL.to_string(),
            access_token: String::new(),
            requests_per_second: 20.0,
            timeout_secs: 30,
            max_retries: MAX_RETRIES,
            retry_base_delay_ms: BASE_RETRY_DELAY_MS,
        }
    }
}

/// HTTP client for the TMDB API with rate limiting and retry logic
///
/// This client automatically:
/// - Limits request rate
/// - Retries on transient errors (429, 5xx) with exponential backoff
/// - Authenticates every request with the configured bearer token
pub struct TmdbClient {
    /// Underlying HTTP client
    client: reqwest::Client,
    /// Rate limiter for request throttling
    rate_limiter: RateLimiter,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl TmdbClient {
    /// Create a new client
    ///
    /// # Errors
    /// - `CatalogError::Config` if the access token is not a valid header value
    ///   or the request rate is not a usable positive number
    /// - `CatalogError::HttpError` if the HTTP client cannot be created
    pub fn new(config: ClientConfig) -> Result<Self> {
        let rate_limiter = RateLimiter::new(config.requests_per_second)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if !config.access_token.is_empty() {
            let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
                .map_err(|_| {
                    CatalogError::Config("access token contains invalid characters".to_string())
                })?;
            bearer.set_sensitive(true);
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            rate_limiter,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    /// Fetch and decode JSON from an API path
    ///
    /// # Arguments
    /// * `path` - Path and query relative to the base URL (e.g., "/search/movie?query=dune")
    ///
    /// # Errors
    /// - `CatalogError::HttpError` - Network error
    /// - `CatalogError::RateLimited` - Server returned 429 after all retries
    /// - `CatalogError::Unauthorized` - Server returned 401
    /// - `CatalogError::NotFound` - Server returned 404
    /// - `CatalogError::Status` - Any other non-success status after retries
    /// - `CatalogError::ParseError` - Body is not the expected JSON
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            self.rate_limiter.acquire().await;

            tracing::debug!(url = %url, attempt, "sending catalog request");
            let response = self.client.get(&url).send().await?;
            let status = response.status();

            if status.is_success() {
                let body = response.bytes().await?;
                return serde_json::from_slice(&body)
                    .map_err(|e| CatalogError::ParseError(e.to_string()));
            }

            let retryable =
                status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < self.max_retries {
                let delay = self.calculate_backoff_delay(attempt);
                tracing::debug!(
                    status = status.as_u16(),
                    delay_ms = delay.as_millis() as u64,
                    "transient catalog error, retrying"
                );
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(match status {
                StatusCode::UNAUTHORIZED => CatalogError::Unauthorized,
                StatusCode::NOT_FOUND => CatalogError::NotFound(path.to_string()),
                StatusCode::TOO_MANY_REQUESTS => CatalogError::RateLimited,
                other => CatalogError::Status(other.as_u16()),
            });
        }
    }

    /// Calculate exponential backoff delay for retry
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay * 2u32.pow(attempt)
    }

    /// Get a reference to the rate limiter (for testing)
    #[cfg(test)]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}
