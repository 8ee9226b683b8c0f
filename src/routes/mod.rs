use axum::{
    http::StatusCode,
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::ProfileStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    models::MovieDetails,
    services::{MetadataProvider, Recommender},
};

pub mod lists;
pub mod movies;
pub mod ratings;
pub mod recommendations;

/// Shared state handed to every handler
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub provider: Arc<dyn MetadataProvider>,
    pub recommender: Recommender,
    /// Base URL poster paths are joined onto
    pub image_base_url: String,
}

/// Movie as rendered by the front end
#[derive(Debug, Serialize)]
pub struct MovieCard {
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_year: Option<i32>,
    pub vote_average: Option<f64>,
    pub genres: Vec<String>,
}

impl MovieCard {
    pub fn from_details(movie: MovieDetails, image_base_url: &str) -> Self {
        Self {
            poster_url: movie.poster_url(image_base_url),
            release_year: movie.release_year(),
            id: movie.id,
            title: movie.title,
            overview: movie.overview,
            vote_average: movie.vote_average,
            genres: movie.genres.into_iter().map(|g| g.name).collect(),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/:user_id/ratings", get(ratings::list))
        .route(
            "/users/:user_id/ratings/:movie_id",
            put(ratings::rate).delete(ratings::remove),
        )
        .route("/users/:user_id/similar", get(recommendations::similar))
        .route(
            "/users/:user_id/recommendations",
            get(recommendations::recommend),
        )
        .route(
            "/users/:user_id/recommendations/genres",
            get(recommendations::genres),
        )
        .route("/users/:user_id/lists/:kind", get(lists::get))
        .route(
            "/users/:user_id/lists/:kind/:movie_id",
            put(lists::add).delete(lists::remove),
        )
        .route("/movies/search", get(movies::search))
        .route("/movies/:movie_id", get(movies::details))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
