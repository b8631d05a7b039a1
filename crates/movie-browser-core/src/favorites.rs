//! Persisted favorites
//!
//! [`FavoritesStore`] keeps the set of favorite movies, at most one entry per
//! movie id, in insertion order. Every mutation is written through to a
//! [`KeyValueStore`] under [`FAVORITES_KEY`]; the set is loaded once when the
//! store is opened.
//!
//! # Stored format
//!
//! ```json
//! {
//!   "state": {
//!     "favoriteMovies": [
//!       { "id": 42, "title": "...", "poster_path": null, "release_date": null, "dateAdded": 1700000000000 }
//!     ]
//!   },
//!   "version": 0
//! }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::storage::KeyValueStore;
use crate::types::{FavoriteMovie, Movie};

/// Storage key holding the favorites blob
pub const FAVORITES_KEY: &str = "favorite-movies";

/// Version written into the stored blob
const FORMAT_VERSION: u32 = 0;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedFavorites {
    state: FavoritesState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FavoritesState {
    #[serde(rename = "favoriteMovies", default)]
    favorite_movies: Vec<FavoriteMovie>,
}

/// Favorite movies with write-through persistence
pub struct FavoritesStore<S> {
    storage: S,
    favorites: Vec<FavoriteMovie>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Load favorites from `storage`.
    ///
    /// A missing key starts empty. A blob that cannot be decoded is logged and
    /// replaced on the next mutation.
    ///
    /// # Errors
    /// Returns an error if the storage backend cannot be read.
    pub fn open(storage: S) -> Result<Self> {
        let favorites = match storage.get_item(FAVORITES_KEY)? {
            Some(blob) => match serde_json::from_str::<PersistedFavorites>(&blob) {
                Ok(persisted) => dedupe(persisted.state.favorite_movies),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unreadable favorites blob");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        tracing::debug!(count = favorites.len(), "favorites loaded");
        Ok(Self { storage, favorites })
    }

    /// Add `movie` if absent, remove it if present.
    ///
    /// Returns whether the movie is a favorite afterwards.
    ///
    /// # Errors
    /// Returns an error if the change cannot be persisted; the in-memory set
    /// is left unchanged in that case.
    pub fn toggle_favorite(&mut self, movie: &Movie) -> Result<bool> {
        self.toggle_at(movie, chrono::Utc::now().timestamp_millis())
    }

    /// [`toggle_favorite`](Self::toggle_favorite) with an explicit timestamp
    pub fn toggle_at(&mut self, movie: &Movie, date_added: i64) -> Result<bool> {
        let previous = self.favorites.clone();

        let now_favorite = match self.position(movie.id) {
            Some(index) => {
                self.favorites.remove(index);
                false
            }
            None => {
                self.favorites.push(FavoriteMovie {
                    movie: movie.clone(),
                    date_added,
                });
                true
            }
        };

        if let Err(e) = self.persist() {
            self.favorites = previous;
            return Err(e);
        }

        tracing::debug!(id = movie.id, favorite = now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    /// Membership test by movie id
    pub fn is_favorite(&self, id: u64) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: u64) -> Option<&FavoriteMovie> {
        self.favorites.iter().find(|favorite| favorite.id() == id)
    }

    /// Favorites in the order they were added
    pub fn favorites(&self) -> &[FavoriteMovie] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.favorites.iter().position(|favorite| favorite.id() == id)
    }

    fn persist(&mut self) -> Result<()> {
        let persisted = PersistedFavorites {
            state: FavoritesState {
                favorite_movies: self.favorites.clone(),
            },
            version: FORMAT_VERSION,
        };
        let blob = serde_json::to_string(&persisted)
            .map_err(|e| CatalogError::Storage(format!("failed to serialize favorites: {e}")))?;
        self.storage.set_item(FAVORITES_KEY, &blob)
    }
}

/// Keep the first entry for every id
fn dedupe(favorites: Vec<FavoriteMovie>) -> Vec<FavoriteMovie> {
    let mut seen = HashSet::new();
    favorites
        .into_iter()
        .filter(|favorite| seen.insert(favorite.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use proptest::prelude::*;
    use tempfile::TempDir;

    /// Storage whose writes always fail
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(CatalogError::Storage("read-only".to_string()))
        }
    }

    fn movie(id: u64) -> Movie {
        Movie::new(id, format!("Movie {}", id))
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut store = FavoritesStore::open(MemoryStore::new()).unwrap();
        let dune = movie(438631);

        assert!(!store.is_favorite(dune.id));
        assert!(store.toggle_at(&dune, 1_000).unwrap());
        assert!(store.is_favorite(dune.id));
        assert_eq!(store.get(dune.id).unwrap().date_added, 1_000);

        assert!(!store.toggle_at(&dune, 2_000).unwrap());
        assert!(!store.is_favorite(dune.id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_toggle_stamps_current_time() {
        let before = chrono::Utc::now().timestamp_millis();
        let mut store = FavoritesStore::open(MemoryStore::new()).unwrap();
        store.toggle_favorite(&movie(1)).unwrap();

        let added = store.get(1).unwrap().date_added;
        assert!(added >= before);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut store = FavoritesStore::open(MemoryStore::new()).unwrap();
        for id in [3, 1, 2] {
            store.toggle_at(&movie(id), id as i64).unwrap();
        }
        store.toggle_at(&movie(1), 9).unwrap();

        let ids: Vec<u64> = store.favorites().iter().map(FavoriteMovie::id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_loads_persisted_entry() {
        let mut storage = MemoryStore::new();
        storage
            .set_item(
                FAVORITES_KEY,
                r#"{"state":{"favoriteMovies":[{"id":42,"title":"The Answer","poster_path":null,"release_date":"1979-10-12","dateAdded":1700000000000}]},"version":0}"#,
            )
            .unwrap();

        let store = FavoritesStore::open(storage).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.is_favorite(42));
        assert_eq!(store.get(42).unwrap().movie.title, "The Answer");
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = FavoritesStore::open(FileStore::open(dir.path()).unwrap()).unwrap();
            store.toggle_at(&movie(1), 10).unwrap();
            store.toggle_at(&movie(2), 20).unwrap();
        }

        let reopened = FavoritesStore::open(FileStore::open(dir.path()).unwrap()).unwrap();
        assert!(reopened.is_favorite(1));
        assert!(reopened.is_favorite(2));

        let blob = reopened.storage().get_item(FAVORITES_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value["version"], 0);
        assert_eq!(value["state"]["favoriteMovies"][1]["dateAdded"], 20);
    }

    #[test]
    fn test_unreadable_blob_starts_empty() {
        let mut storage = MemoryStore::new();
        storage.set_item(FAVORITES_KEY, "{not json").unwrap();

        let store = FavoritesStore::open(storage).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_ids_in_blob_are_collapsed() {
        let mut storage = MemoryStore::new();
        storage
            .set_item(
                FAVORITES_KEY,
                r#"{"state":{"favoriteMovies":[
                    {"id":7,"title":"first","dateAdded":1},
                    {"id":7,"title":"second","dateAdded":2}
                ]}}"#,
            )
            .unwrap();

        let store = FavoritesStore::open(storage).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(7).unwrap().movie.title, "first");
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let mut store = FavoritesStore::open(ReadOnlyStore).unwrap();
        let result = store.toggle_at(&movie(5), 1);

        assert!(matches!(result, Err(CatalogError::Storage(_))));
        assert!(!store.is_favorite(5));
    }

    proptest! {
        #[test]
        fn prop_double_toggle_restores_set(
            initial in proptest::collection::vec(1u64..50, 0..10),
            id in 1u64..50,
        ) {
            let mut store = FavoritesStore::open(MemoryStore::new()).unwrap();
            for existing in initial {
                if !store.is_favorite(existing) {
                    store.toggle_at(&movie(existing), 0).unwrap();
                }
            }
            let before: Vec<u64> = store.favorites().iter().map(FavoriteMovie::id).collect();
            let was_favorite = store.is_favorite(id);

            let after_first = store.toggle_at(&movie(id), 1).unwrap();
            prop_assert_eq!(after_first, !was_favorite);
            prop_assert_eq!(store.is_favorite(id), !was_favorite);

            store.toggle_at(&movie(id), 2).unwrap();
            prop_assert_eq!(store.is_favorite(id), was_favorite);

            let mut after: Vec<u64> = store.favorites().iter().map(FavoriteMovie::id).collect();
            let mut before_sorted = before.clone();
            after.sort_unstable();
            before_sorted.sort_unstable();
            prop_assert_eq!(after, before_sorted);
        }
    }
}
