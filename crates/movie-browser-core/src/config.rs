//! Application configuration
//!
//! Settings come from the environment (optionally seeded from a `.env` file).
//!
//! | Variable                     | Required | Default                               |
//! |------------------------------|----------|---------------------------------------|
//! | `TMDB_API_READ_ACCESS_TOKEN` | yes      | --                                    |
//! | `TMDB_API_BASE_URL`          | no       | `https://api.themoviedb.org/3`        |
//! | `TMDB_REQUESTS_PER_SECOND`   | no       | `20`                                  |
//! | `TMDB_TIMEOUT_SECS`          | no       | `30`                                  |
//! | `MOVIE_BROWSER_DATA_DIR`     | no       | `$HOME/.local/share/movie-browser`    |
//! | `MOVIE_BROWSER_DEBOUNCE_MS`  | no       | `300`                                 |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::client::ClientConfig;
use crate::debounce::DEFAULT_DEBOUNCE;
use crate::error::{CatalogError, Result};

/// Full configuration of the application core
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TMDB client settings
    pub client: ClientConfig,
    /// Directory holding the favorites file
    pub data_dir: PathBuf,
    /// Quiescence window for text entry and the rating slider
    pub debounce: Duration,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first, if present.
    ///
    /// # Errors
    /// `CatalogError::Config` if the access token is missing or a value does
    /// not parse.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// `CatalogError::Config` if the access token is missing or a value does
    /// not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ClientConfig::default();

        let access_token = lookup("TMDB_API_READ_ACCESS_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                CatalogError::Config("TMDB_API_READ_ACCESS_TOKEN is not set".to_string())
            })?;

        let client = ClientConfig {
            base_url: lookup("TMDB_API_BASE_URL").unwrap_or(defaults.base_url),
            access_token: access_token.trim().to_string(),
            requests_per_second: parse_var(
                &lookup,
                "TMDB_REQUESTS_PER_SECOND",
                defaults.requests_per_second,
            )?,
            timeout_secs: parse_var(&lookup, "TMDB_TIMEOUT_SECS", defaults.timeout_secs)?,
            ..defaults
        };
        if !(client.requests_per_second > 0.0) {
            return Err(CatalogError::Config(
                "TMDB_REQUESTS_PER_SECOND must be positive".to_string(),
            ));
        }

        let data_dir = match lookup("MOVIE_BROWSER_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(lookup("HOME")),
        };

        let debounce_ms = parse_var(
            &lookup,
            "MOVIE_BROWSER_DEBOUNCE_MS",
            DEFAULT_DEBOUNCE.as_millis() as u64,
        )?;

        Ok(Self {
            client,
            data_dir,
            debounce: Duration::from_millis(debounce_ms),
        })
    }
}

/// `$HOME/.local/share/movie-browser`, or `./movie-browser` without a home
fn default_data_dir(home: Option<String>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(home).join(".local/share/movie-browser"),
        None => PathBuf::from("movie-browser"),
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CatalogError::Config(format!("{} has an invalid value {:?}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TMDB_API_READ_ACCESS_TOKEN", "token"),
            ("HOME", "/home/ana"),
        ]))
        .unwrap();

        assert_eq!(config.client.access_token, "token");
        assert_eq!(config.client.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.client.timeout_secs, 30);
        assert_eq!(
            config.data_dir,
            PathBuf::from("/home/ana/.local/share/movie-browser")
        );
        assert_eq!(config.debounce, Duration::from_millis(300));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TMDB_API_READ_ACCESS_TOKEN", "token"),
            ("TMDB_API_BASE_URL", "http://localhost:9999/3"),
            ("TMDB_REQUESTS_PER_SECOND", "4"),
            ("TMDB_TIMEOUT_SECS", "5"),
            ("MOVIE_BROWSER_DATA_DIR", "/tmp/movies"),
            ("MOVIE_BROWSER_DEBOUNCE_MS", "150"),
        ]))
        .unwrap();

        assert_eq!(config.client.base_url, "http://localhost:9999/3");
        assert_eq!(config.client.requests_per_second, 4.0);
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/movies"));
        assert_eq!(config.debounce, Duration::from_millis(150));
    }

    #[test]
    fn test_missing_token_is_an_error() {
        match AppConfig::from_lookup(lookup_from(&[("TMDB_API_READ_ACCESS_TOKEN", "  ")])) {
            Err(CatalogError::Config(msg)) => assert!(msg.contains("TMDB_API_READ_ACCESS_TOKEN")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("TMDB_API_READ_ACCESS_TOKEN", "token"),
            ("TMDB_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(CatalogError::Config(_))));
    }

    #[test]
    fn test_zero_rate_is_an_error() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("TMDB_API_READ_ACCESS_TOKEN", "token"),
            ("TMDB_REQUESTS_PER_SECOND", "0"),
        ]));
        assert!(matches!(result, Err(CatalogError::Config(_))));
    }
}
