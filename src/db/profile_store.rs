use crate::{
    error::AppResult,
    models::{ListKind, Rating},
};

/// Per-user document store holding ratings, watchlist and favorites
///
/// The recommender only reads from it. Writes come from the rating and list
/// endpoints. Unknown users are never an error: reads return empty collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// All rating records of a user
    async fn list_ratings(&self, user_id: &str) -> AppResult<Vec<Rating>>;

    /// Every user with at least one rating, ascending
    async fn list_user_ids(&self) -> AppResult<Vec<String>>;

    /// Inserts or replaces the rating keyed by (user, movie)
    async fn put_rating(&self, rating: &Rating) -> AppResult<()>;

    /// Returns whether a rating existed
    async fn remove_rating(&self, user_id: &str, movie_id: &str) -> AppResult<bool>;

    /// Appends a movie to a list; adding a movie already present is a no-op
    async fn add_to_list(&self, user_id: &str, kind: ListKind, movie_id: &str) -> AppResult<()>;

    /// Returns whether the movie was on the list
    async fn remove_from_list(
        &self,
        user_id: &str,
        kind: ListKind,
        movie_id: &str,
    ) -> AppResult<bool>;

    /// Movie ids on a list in insertion order
    async fn get_list(&self, user_id: &str, kind: ListKind) -> AppResult<Vec<String>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
