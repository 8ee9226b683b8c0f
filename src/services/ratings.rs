use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{ListKind, Rating, RatingLabel},
    services::providers::parse_movie_id,
};

/// Checks the user id and returns the movie id in canonical decimal form
///
/// `"0238"`, `"+238"` and `" 238 "` all name movie 238 and are stored as `"238"`.
fn validate(user_id: &str, movie_id: &str) -> AppResult<String> {
    if user_id.trim().is_empty() {
        return Err(AppError::InvalidInput("User id cannot be empty".to_string()));
    }
    Ok(parse_movie_id(movie_id)?.to_string())
}

/// Records (or replaces) a user's rating of a movie
pub async fn rate_movie(
    store: &dyn ProfileStore,
    user_id: &str,
    movie_id: &str,
    label: RatingLabel,
) -> AppResult<Rating> {
    let movie_id = validate(user_id, movie_id)?;

    let rating = Rating::new(user_id.to_string(), movie_id, label);
    store.put_rating(&rating).await?;

    tracing::info!(
        user_id = %user_id,
        movie_id = %rating.movie_id,
        label = %label,
        store = store.name(),
        "Rating stored"
    );

    Ok(rating)
}

pub async fn remove_rating(store: &dyn ProfileStore, user_id: &str, movie_id: &str) -> AppResult<()> {
    let movie_id = validate(user_id, movie_id)?;

    if !store.remove_rating(user_id, &movie_id).await? {
        return Err(AppError::NotFound(format!(
            "No rating by {} for movie {}",
            user_id, movie_id
        )));
    }

    tracing::info!(user_id = %user_id, movie_id = %movie_id, "Rating removed");
    Ok(())
}

pub async fn add_to_list(
    store: &dyn ProfileStore,
    user_id: &str,
    kind: ListKind,
    movie_id: &str,
) -> AppResult<Vec<String>> {
    let movie_id = validate(user_id, movie_id)?;
    store.add_to_list(user_id, kind, &movie_id).await?;
    store.get_list(user_id, kind).await
}

pub async fn remove_from_list(
    store: &dyn ProfileStore,
    user_id: &str,
    kind: ListKind,
    movie_id: &str,
) -> AppResult<Vec<String>> {
    let movie_id = validate(user_id, movie_id)?;

    if !store.remove_from_list(user_id, kind, &movie_id).await? {
        return Err(AppError::NotFound(format!(
            "Movie {} is not on the {} of {}",
            movie_id, kind, user_id
        )));
    }
    store.get_list(user_id, kind).await
}
