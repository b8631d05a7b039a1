//! Tauri commands for Movie Browser
//!
//! This module contains all Tauri commands that can be invoked from the frontend.

use serde::Serialize;
use tauri::State;

use crate::AppState;
use movie_browser_core::{FavoriteMovie, Genre, Movie, SearchSnapshot, SentinelId};

/// Genre entry for the filter menu
#[derive(Debug, Clone, Serialize)]
pub struct GenreOption {
    pub id: u32,
    pub name: &'static str,
}

/// Search box input changed.
///
/// Resolves once typing has paused for the debounce window. Calls superseded
/// by a later keystroke resolve with the current state without searching.
#[tauri::command]
pub async fn update_search_term(
    state: State<'_, AppState>,
    term: String,
) -> Result<SearchSnapshot, String> {
    Ok(state.update_search_term(term).await)
}

/// Rating slider moved.
///
/// # Returns
/// * `Err(String)` if the value is outside 1-10
#[tauri::command]
pub async fn update_rating_max(
    state: State<'_, AppState>,
    value: f32,
) -> Result<SearchSnapshot, String> {
    state
        .update_rating_max(value)
        .await
        .map_err(|e| e.to_string())
}

/// Genre menu selection; `None` means all genres.
#[tauri::command]
pub async fn select_genre(
    state: State<'_, AppState>,
    genre_id: Option<u32>,
) -> Result<SearchSnapshot, String> {
    state
        .select_genre(genre_id)
        .await
        .map_err(|e| e.to_string())
}

/// Year field confirmed; blank clears the filter.
#[tauri::command]
pub async fn select_year(
    state: State<'_, AppState>,
    year: String,
) -> Result<SearchSnapshot, String> {
    state.select_year(year).await.map_err(|e| e.to_string())
}

/// Search button pressed or Enter typed.
#[tauri::command]
pub async fn submit_search(state: State<'_, AppState>) -> Result<SearchSnapshot, String> {
    Ok(state.submit_search().await)
}

/// Visibility report for the infinite-scroll sentinel.
///
/// # Arguments
/// * `sentinel` - Sentinel id from the last snapshot
/// * `ratio` - Visible fraction of the sentinel (0.0 - 1.0)
#[tauri::command]
pub async fn sentinel_visible(
    state: State<'_, AppState>,
    sentinel: SentinelId,
    ratio: f32,
) -> Result<SearchSnapshot, String> {
    Ok(state.sentinel_visible(sentinel, ratio).await)
}

/// Current search state.
#[tauri::command]
pub async fn search_snapshot(state: State<'_, AppState>) -> Result<SearchSnapshot, String> {
    Ok(state.snapshot().await)
}

/// Search page shown; the snapshot carries the sentinel to observe.
#[tauri::command]
pub async fn search_page_mounted(state: State<'_, AppState>) -> Result<SearchSnapshot, String> {
    Ok(state.search_page_mounted().await)
}

/// Search page hidden; the frontend disconnects its observer.
#[tauri::command]
pub async fn search_page_unmounted(state: State<'_, AppState>) -> Result<(), String> {
    state.search_page_unmounted().await;
    Ok(())
}

/// Genres available in the filter menu.
#[tauri::command]
pub fn list_genres() -> Vec<GenreOption> {
    Genre::ALL
        .into_iter()
        .map(|genre| GenreOption {
            id: genre.id(),
            name: genre.name(),
        })
        .collect()
}

/// Heart button on a card, or "Remove from Favorites" in the sidebar.
///
/// # Returns
/// * `Ok(bool)` whether the movie is a favorite afterwards
/// * `Err(String)` if the change could not be saved
#[tauri::command]
pub async fn toggle_favorite(state: State<'_, AppState>, movie: Movie) -> Result<bool, String> {
    state
        .toggle_favorite(&movie)
        .await
        .map_err(|e| e.to_string())
}

/// Whether the movie with `id` is a favorite.
#[tauri::command]
pub async fn is_favorite(state: State<'_, AppState>, id: u64) -> Result<bool, String> {
    Ok(state.is_favorite(id).await)
}

/// Favorites in the order they were added.
#[tauri::command]
pub async fn list_favorites(state: State<'_, AppState>) -> Result<Vec<FavoriteMovie>, String> {
    Ok(state.list_favorites().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_genres_covers_catalog() {
        let genres = list_genres();
        assert_eq!(genres.len(), Genre::ALL.len());
        assert!(genres.iter().any(|g| g.id == 878 && g.name == "Science Fiction"));
    }
}
