/// Movie metadata provider abstraction
///
/// The recommender only knows movies by id; a provider resolves those ids to
/// the title, poster, overview and genres the front end renders. TMDB is the
/// only implementation, but tests swap in mocks through this seam.
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetails, MovieSearchPage},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Resolves a movie id (decimal string) to its details
    async fn fetch_movie(&self, movie_id: &str) -> AppResult<MovieDetails>;

    /// Searches movies by title
    async fn search_movies(&self, query: &str, page: u32) -> AppResult<MovieSearchPage>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fetches details for several movies concurrently, one provider call per id
///
/// Results come back in the order of `movie_ids`. The first failure fails the
/// whole batch and aborts the lookups still in flight.
pub async fn fetch_movies(
    provider: Arc<dyn MetadataProvider>,
    movie_ids: &[String],
) -> AppResult<Vec<MovieDetails>> {
    let tasks: Vec<_> = movie_ids
        .iter()
        .cloned()
        .map(|movie_id| {
            let provider = provider.clone();
            tokio::spawn(async move { provider.fetch_movie(&movie_id).await })
        })
        .collect();

    let mut movies = Vec::with_capacity(tasks.len());
    let mut pending = tasks.into_iter().zip(movie_ids);
    while let Some((task, movie_id)) = pending.next() {
        let error = match task.await {
            Ok(Ok(movie)) => {
                movies.push(movie);
                continue;
            }
            Ok(Err(e)) => {
                tracing::error!(
                    movie_id = %movie_id,
                    provider = provider.name(),
                    error = %e,
                    "Movie detail fetch failed"
                );
                e
            }
            Err(e) => {
                tracing::error!(error = %e, "Task join error");
                AppError::Internal(e.to_string())
            }
        };

        for (task, _) in pending.by_ref() {
            task.abort();
        }
        return Err(error);
    }

    Ok(movies)
}

/// Parses a decimal movie id as used in rating maps into a TMDB id
pub fn parse_movie_id(movie_id: &str) -> AppResult<u64> {
    movie_id
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid movie id: {:?}", movie_id)))
}
