use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{error::AppResult, models::ListKind, routes::AppState, services::ratings};

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub kind: ListKind,
    pub movie_ids: Vec<String>,
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path((user_id, kind)): Path<(String, ListKind)>,
) -> AppResult<Json<ListResponse>> {
    let movie_ids = state.store.get_list(&user_id, kind).await?;
    Ok(Json(ListResponse { kind, movie_ids }))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    Path((user_id, kind, movie_id)): Path<(String, ListKind, String)>,
) -> AppResult<Json<ListResponse>> {
    let movie_ids = ratings::add_to_list(state.store.as_ref(), &user_id, kind, &movie_id).await?;
    Ok(Json(ListResponse { kind, movie_ids }))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((user_id, kind, movie_id)): Path<(String, ListKind, String)>,
) -> AppResult<Json<ListResponse>> {
    let movie_ids =
        ratings::remove_from_list(state.store.as_ref(), &user_id, kind, &movie_id).await?;
    Ok(Json(ListResponse { kind, movie_ids }))
}
