use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::MovieSearchPage,
    routes::{AppState, MovieCard},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default = "first_page")]
    page: u32,
}

fn first_page() -> u32 {
    1
}

/// Handler for movie search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<MovieSearchPage>> {
    let results = state.provider.search_movies(&params.q, params.page).await?;
    Ok(Json(results))
}

/// Handler for movie details endpoint
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<MovieCard>> {
    let movie = state.provider.fetch_movie(&movie_id).await?;
    Ok(Json(MovieCard::from_details(movie, &state.image_base_url)))
}
