use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Rating, RatingLabel},
    routes::AppState,
    services::ratings,
};

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub rating: RatingLabel,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub movie_id: String,
    pub rating: RatingLabel,
    pub score: u8,
    pub rated_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            score: rating.score(),
            movie_id: rating.movie_id,
            rating: rating.label,
            rated_at: rating.rated_at,
        }
    }
}

/// Lists every rating of a user
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<RatingResponse>>> {
    let ratings = state.store.list_ratings(&user_id).await?;
    Ok(Json(ratings.into_iter().map(RatingResponse::from).collect()))
}

/// Rates a movie, replacing any earlier rating
pub async fn rate(
    State(state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(String, String)>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<RatingResponse>> {
    let rating = ratings::rate_movie(state.store.as_ref(), &user_id, &movie_id, request.rating).await?;
    Ok(Json(rating.into()))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((user_id, movie_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    ratings::remove_rating(state.store.as_ref(), &user_id, &movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
