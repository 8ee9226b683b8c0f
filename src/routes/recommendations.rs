use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{GenreScore, SimilarityScore},
    routes::{AppState, MovieCard},
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub limit: Option<usize>,
}

fn first_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct RecommendationPage {
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<MovieCard>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Query(params): Query<PageQuery>,
) -> AppResult<Json<RecommendationPage>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        page = params.page,
        "Processing recommendation request"
    );

    let movies = state
        .recommender
        .recommendations(&user_id, params.page)
        .await?;

    Ok(Json(RecommendationPage {
        page: params.page,
        page_size: state.recommender.settings().page_size,
        results: movies
            .into_iter()
            .map(|movie| MovieCard::from_details(movie, &state.image_base_url))
            .collect(),
    }))
}

/// Handler for genre affinity endpoint
pub async fn genres(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<GenreScore>>> {
    let genres = state.recommender.genre_recommendations(&user_id).await?;
    Ok(Json(genres))
}

/// Handler for similar users endpoint
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<SimilarQuery>,
) -> AppResult<Json<Vec<SimilarityScore>>> {
    let top_n = params
        .limit
        .unwrap_or(state.recommender.settings().similar_users);
    let ratings = state.recommender.user_ratings(&user_id).await?;
    let similar = state
        .recommender
        .find_similar_users(&user_id, &ratings, top_n)
        .await?;
    Ok(Json(similar))
}
