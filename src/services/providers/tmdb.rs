/// TMDB (The Movie Database) metadata provider
///
/// API Flow:
/// 1. Details: /movie/{id} → title, poster, overview, genres
/// 2. Search: /search/movie?query=&page= → paged summaries with genre ids
///
/// Authenticates with the v3 `api_key` query parameter. Both calls go through
/// the optional Redis cache.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{MovieDetails, MovieSearchPage},
    services::providers::{parse_movie_id, MetadataProvider},
};
use reqwest::{Client as HttpClient, Response, StatusCode};

const DETAILS_CACHE_TTL: u64 = 604800; // 1 week
const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl TmdbProvider {
    pub fn new(cache: Option<Cache>, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Maps TMDB error statuses onto our error taxonomy
    async fn check_status(response: Response, what: &str) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{} not found on TMDB", what)));
        }

        Err(AppError::ExternalApi(format!(
            "TMDB API returned status {}: {}",
            status, body
        )))
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_movie(&self, movie_id: &str) -> AppResult<MovieDetails> {
        let id = parse_movie_id(movie_id)?;

        cached!(
            self.cache,
            CacheKey::MovieDetails(id),
            DETAILS_CACHE_TTL,
            async move {
                let url = format!("{}/movie/{}", self.api_url, id);

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[("api_key", self.api_key.as_str()), ("language", LANGUAGE)])
                    .send()
                    .await?;

                let response = Self::check_status(response, &format!("Movie {}", id)).await?;

                let response_text = response.text().await?;
                let movie: MovieDetails = serde_json::from_str(&response_text).map_err(|e| {
                    tracing::error!(
                        error = %e,
                        response = %response_text,
                        "Failed to deserialize TMDB movie details"
                    );
                    AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
                })?;

                tracing::debug!(
                    movie_id = id,
                    title = %movie.title,
                    provider = "tmdb",
                    "Movie details fetched"
                );

                Ok::<_, AppError>(movie)
            }
        )
    }

    async fn search_movies(&self, query: &str, page: u32) -> AppResult<MovieSearchPage> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        if page == 0 {
            return Err(AppError::InvalidInput(
                "Page must be at least 1".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::MovieSearch {
                query: query.to_string(),
                page,
            },
            SEARCH_CACHE_TTL,
            async move {
                let url = format!("{}/search/movie", self.api_url);
                let page_param = page.to_string();

                let response = self
                    .http_client
                    .get(&url)
                    .query(&[
                        ("api_key", self.api_key.as_str()),
                        ("language", LANGUAGE),
                        ("query", query),
                        ("page", page_param.as_str()),
                        ("include_adult", "false"),
                    ])
                    .send()
                    .await?;

                let response = Self::check_status(response, "Search").await?;
                let results: MovieSearchPage = response.json().await?;

                tracing::info!(
                    query = %query,
                    page,
                    results = results.results.len(),
                    provider = "tmdb",
                    "Movie search completed"
                );

                Ok::<_, AppError>(results)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
