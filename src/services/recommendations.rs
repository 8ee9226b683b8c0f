use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::instrument;

use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{
        to_rating_map, GenreScore, MovieDetails, RecommendationCandidate, SimilarityScore,
        UserRatingMap,
    },
    services::{
        providers::{fetch_movies, MetadataProvider},
        similarity::similarity,
    },
};

pub const DEFAULT_SIMILAR_USERS: usize = 10;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Tunables for the recommender
#[derive(Debug, Clone, Copy)]
pub struct RecommenderSettings {
    /// How many correlated users feed a recommendation
    pub similar_users: usize,
    pub page_size: usize,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            similar_users: DEFAULT_SIMILAR_USERS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Similarity-based recommender
///
/// Ranks movies for a user by what users with correlated taste rated highly.
/// Nothing is cached: every call rescans the profile store, so results always
/// reflect the ratings as they are at call time.
pub struct Recommender {
    store: Arc<dyn ProfileStore>,
    provider: Arc<dyn MetadataProvider>,
    settings: RecommenderSettings,
}

/// A similar user together with the ratings that produced the score
struct Neighbour {
    score: SimilarityScore,
    ratings: UserRatingMap,
}

impl Recommender {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        provider: Arc<dyn MetadataProvider>,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            store,
            provider,
            settings,
        }
    }

    pub fn settings(&self) -> RecommenderSettings {
        self.settings
    }

    /// Movie id → score for a user; empty when the user has never rated anything
    pub async fn user_ratings(&self, user_id: &str) -> AppResult<UserRatingMap> {
        let ratings = self.store.list_ratings(user_id).await?;
        Ok(to_rating_map(&ratings))
    }

    /// Users whose ratings correlate positively with `ratings`, best first
    ///
    /// Scans every user in the store and fetches each one's ratings in turn.
    #[instrument(skip(self, ratings), fields(rated = ratings.len()))]
    pub async fn find_similar_users(
        &self,
        user_id: &str,
        ratings: &UserRatingMap,
        top_n: usize,
    ) -> AppResult<Vec<SimilarityScore>> {
        let neighbours = self.neighbours(user_id, ratings, top_n).await?;
        Ok(neighbours.into_iter().map(|n| n.score).collect())
    }

    async fn neighbours(
        &self,
        user_id: &str,
        ratings: &UserRatingMap,
        top_n: usize,
    ) -> AppResult<Vec<Neighbour>> {
        let user_ids = self.store.list_user_ids().await?;
        let mut neighbours = Vec::new();

        for other_id in user_ids.iter().filter(|id| id.as_str() != user_id) {
            let other_ratings = self.user_ratings(other_id).await?;
            let correlation = similarity(ratings, &other_ratings);
            if correlation > 0.0 {
                neighbours.push(Neighbour {
                    score: SimilarityScore {
                        user_id: other_id.clone(),
                        correlation,
                    },
                    ratings: other_ratings,
                });
            }
        }

        neighbours.sort_by(|a, b| {
            b.score
                .correlation
                .partial_cmp(&a.score.correlation)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.score.user_id.cmp(&b.score.user_id))
        });
        neighbours.truncate(top_n);

        tracing::debug!(
            scanned = user_ids.len(),
            kept = neighbours.len(),
            "Similar users found"
        );

        Ok(neighbours)
    }

    /// Full candidate ranking for a user, before pagination
    #[instrument(skip(self))]
    pub async fn ranked_candidates(&self, user_id: &str) -> AppResult<Vec<RecommendationCandidate>> {
        let ratings = self.user_ratings(user_id).await?;
        let neighbours = self
            .neighbours(user_id, &ratings, self.settings.similar_users)
            .await?;

        let neighbour_ratings: Vec<&UserRatingMap> = neighbours.iter().map(|n| &n.ratings).collect();
        Ok(rank_candidates(&ratings, &neighbour_ratings))
    }

    /// One page of recommended movies, resolved to full details
    ///
    /// Pages start at 1. The ranking is recomputed on every call, so pages
    /// fetched at different times are not a consistent snapshot.
    #[instrument(skip(self))]
    pub async fn recommendations(&self, user_id: &str, page: usize) -> AppResult<Vec<MovieDetails>> {
        if page == 0 {
            return Err(AppError::InvalidInput(
                "Page must be at least 1".to_string(),
            ));
        }

        let ranked = self.ranked_candidates(user_id).await?;
        let page_ids: Vec<String> = paginate(&ranked, page, self.settings.page_size)
            .iter()
            .map(|c| c.movie_id.clone())
            .collect();

        let movies = fetch_movies(self.provider.clone(), &page_ids).await?;

        tracing::info!(
            user_id = %user_id,
            page,
            candidates = ranked.len(),
            returned = movies.len(),
            "Recommendations computed"
        );

        Ok(movies)
    }

    /// Like [`Recommender::recommendations`], but any failure yields an empty list
    ///
    /// For callers that render "nothing to recommend" and "something broke" the same way.
    pub async fn recommendations_or_empty(&self, user_id: &str, page: usize) -> Vec<MovieDetails> {
        match self.recommendations(user_id, page).await {
            Ok(movies) => movies,
            Err(e) => {
                tracing::warn!(user_id = %user_id, page, error = %e, "Recommendations failed, returning none");
                Vec::new()
            }
        }
    }

    /// Genres ordered by the mean score the user gave movies in them
    #[instrument(skip(self))]
    pub async fn genre_recommendations(&self, user_id: &str) -> AppResult<Vec<GenreScore>> {
        let ratings = self.user_ratings(user_id).await?;

        let mut movie_ids: Vec<String> = ratings.keys().cloned().collect();
        movie_ids.sort();
        let movies = fetch_movies(self.provider.clone(), &movie_ids).await?;

        let scored: Vec<(&MovieDetails, u8)> = movies
            .iter()
            .zip(&movie_ids)
            .map(|(movie, id)| (movie, ratings[id]))
            .collect();

        Ok(rank_genres(&scored))
    }
}

/// Ranks movies the neighbours rated and the user has not
///
/// Aggregate score is the plain mean of the contributing neighbours' scores.
/// Ordered by score, then by contributor count, then by movie id.
pub fn rank_candidates(
    own_ratings: &UserRatingMap,
    neighbour_ratings: &[&UserRatingMap],
) -> Vec<RecommendationCandidate> {
    let mut totals: HashMap<&str, (u32, usize)> = HashMap::new();

    for ratings in neighbour_ratings {
        for (movie_id, &score) in ratings.iter() {
            if own_ratings.contains_key(movie_id) {
                continue;
            }
            let entry = totals.entry(movie_id.as_str()).or_insert((0, 0));
            entry.0 += u32::from(score);
            entry.1 += 1;
        }
    }

    let mut candidates: Vec<RecommendationCandidate> = totals
        .into_iter()
        .map(|(movie_id, (sum, count))| RecommendationCandidate {
            movie_id: movie_id.to_string(),
            aggregate_score: f64::from(sum) / count as f64,
            contributing_user_count: count,
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.aggregate_score
            .partial_cmp(&a.aggregate_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.contributing_user_count.cmp(&a.contributing_user_count))
            .then_with(|| a.movie_id.cmp(&b.movie_id))
    });

    candidates
}

/// Offset pagination; page 1 is the first `page_size` items
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Accumulates the user's scores per genre and orders genres by mean
pub fn rank_genres(scored_movies: &[(&MovieDetails, u8)]) -> Vec<GenreScore> {
    // genre id → (name, sum, count)
    let mut totals: BTreeMap<u64, (String, u32, usize)> = BTreeMap::new();

    for (movie, score) in scored_movies {
        for genre in &movie.genres {
            let entry = totals
                .entry(genre.id)
                .or_insert_with(|| (genre.name.clone(), 0, 0));
            entry.1 += u32::from(*score);
            entry.2 += 1;
        }
    }

    let mut genres: Vec<GenreScore> = totals
        .into_iter()
        .map(|(genre_id, (genre_name, sum, count))| GenreScore {
            genre_id,
            genre_name,
            mean_score: f64::from(sum) / count as f64,
            rated_count: count,
        })
        .collect();

    genres.sort_by(|a, b| {
        b.mean_score
            .partial_cmp(&a.mean_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.rated_count.cmp(&a.rated_count))
            .then_with(|| a.genre_id.cmp(&b.genre_id))
    });

    genres
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryProfileStore, MockProfileStore};
    use crate::models::{Genre, Rating, RatingLabel};
    use crate::services::providers::MockMetadataProvider;
    use tokio_test::{assert_err, assert_ok};

    fn rating(user: &str, movie: &str, label: RatingLabel) -> Rating {
        Rating::new(user.to_string(), movie.to_string(), label)
    }

    fn map(entries: &[(&str, u8)]) -> UserRatingMap {
        entries
            .iter()
            .map(|&(movie, score)| (movie.to_string(), score))
            .collect()
    }

    fn movie(id: u64, genres: &[(u64, &str)]) -> MovieDetails {
        MovieDetails {
            genres: genres
                .iter()
                .map(|&(id, name)| Genre {
                    id,
                    name: name.to_string(),
                })
                .collect(),
            ..MovieDetails::stub(id)
        }
    }

    /// Provider that resolves any numeric id to a genre-less movie
    fn echo_provider() -> MockMetadataProvider {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_movie()
            .returning(|id| Ok(movie(id.parse().unwrap(), &[])));
        provider.expect_name().return_const("mock");
        provider
    }

    fn recommender(store: impl ProfileStore + 'static, provider: MockMetadataProvider) -> Recommender {
        Recommender::new(
            Arc::new(store),
            Arc::new(provider),
            RecommenderSettings::default(),
        )
    }

    async fn taste_store() -> MemoryProfileStore {
        MemoryProfileStore::with_ratings(vec![
            // alice is the caller
            rating("alice", "238", RatingLabel::Great),
            rating("alice", "680", RatingLabel::Good),
            rating("alice", "13", RatingLabel::Nooo),
            // bob agrees with alice and loves 550, likes 155
            rating("bob", "238", RatingLabel::Great),
            rating("bob", "680", RatingLabel::Good),
            rating("bob", "13", RatingLabel::Meh),
            rating("bob", "550", RatingLabel::Great),
            rating("bob", "155", RatingLabel::Good),
            // carol mostly agrees and is lukewarm on 550
            rating("carol", "238", RatingLabel::Good),
            rating("carol", "13", RatingLabel::Nooo),
            rating("carol", "550", RatingLabel::Meh),
            rating("carol", "278", RatingLabel::Great),
            // dave has the opposite taste
            rating("dave", "238", RatingLabel::Nooo),
            rating("dave", "680", RatingLabel::Meh),
            rating("dave", "13", RatingLabel::Great),
            rating("dave", "424", RatingLabel::Great),
        ])
        .await
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_ratings() {
        let rec = recommender(MemoryProfileStore::new(), MockMetadataProvider::new());
        let ratings = assert_ok!(rec.user_ratings("ghost").await);
        assert!(ratings.is_empty());
    }

    #[tokio::test]
    async fn test_find_similar_users_excludes_self_and_negatives() {
        let rec = recommender(taste_store().await, MockMetadataProvider::new());
        let ratings = rec.user_ratings("alice").await.unwrap();

        let similar = rec.find_similar_users("alice", &ratings, 10).await.unwrap();
        let ids: Vec<&str> = similar.iter().map(|s| s.user_id.as_str()).collect();

        // carol agrees perfectly on the two movies she shares with alice; bob nearly so
        assert_eq!(ids, vec!["carol", "bob"]);
        assert!(similar.iter().all(|s| s.correlation > 0.0));
        assert!(similar
            .windows(2)
            .all(|w| w[0].correlation >= w[1].correlation));
    }

    #[tokio::test]
    async fn test_find_similar_users_truncates() {
        let rec = recommender(taste_store().await, MockMetadataProvider::new());
        let ratings = rec.user_ratings("alice").await.unwrap();

        let similar = rec.find_similar_users("alice", &ratings, 1).await.unwrap();
        assert_eq!(similar.len(), 1);
    }

    #[tokio::test]
    async fn test_recommendations_exclude_rated_movies() {
        let rec = recommender(taste_store().await, echo_provider());
        let own = rec.user_ratings("alice").await.unwrap();

        let movies = rec.recommendations("alice", 1).await.unwrap();
        assert!(!movies.is_empty());
        for movie in &movies {
            assert!(!own.contains_key(&movie.id.to_string()));
        }
        // dave is anti-correlated, so his favourite never shows up
        assert!(movies.iter().all(|m| m.id != 424));
    }

    #[tokio::test]
    async fn test_recommendations_page_zero_rejected() {
        let rec = recommender(taste_store().await, echo_provider());
        let result = rec.recommendations("alice", 0).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_second_page_is_ranks_21_to_40() {
        let mut ratings = vec![
            rating("me", "1", RatingLabel::Great),
            rating("me", "2", RatingLabel::Meh),
            rating("twin", "1", RatingLabel::Great),
            rating("twin", "2", RatingLabel::Meh),
        ];
        let labels = RatingLabel::ALL;
        for i in 0..45 {
            let movie_id = (100 + i).to_string();
            ratings.push(rating("twin", &movie_id, labels[i % labels.len()]));
        }

        let rec = recommender(MemoryProfileStore::with_ratings(ratings).await, echo_provider());

        let ranked = rec.ranked_candidates("me").await.unwrap();
        assert_eq!(ranked.len(), 45);

        let page_two = rec.recommendations("me", 2).await.unwrap();
        let expected: Vec<String> = ranked[20..40].iter().map(|c| c.movie_id.clone()).collect();
        let got: Vec<String> = page_two.iter().map(|m| m.id.to_string()).collect();
        assert_eq!(got, expected);

        let page_three = rec.recommendations("me", 3).await.unwrap();
        assert_eq!(page_three.len(), 5);

        let page_four = rec.recommendations("me", 4).await.unwrap();
        assert!(page_four.is_empty());
    }

    #[tokio::test]
    async fn test_ranking_reflects_ratings_changed_between_pages() {
        let store = MemoryProfileStore::with_ratings(vec![
            rating("me", "1", RatingLabel::Great),
            rating("me", "2", RatingLabel::Meh),
            rating("twin", "1", RatingLabel::Great),
            rating("twin", "2", RatingLabel::Meh),
            rating("twin", "100", RatingLabel::Good),
            rating("twin", "101", RatingLabel::Meh),
        ])
        .await;
        let rec = recommender(store.clone(), echo_provider());

        let first: Vec<u64> = rec
            .recommendations("me", 1)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(first, vec![100, 101]);

        store
            .put_rating(&rating("twin", "101", RatingLabel::Great))
            .await
            .unwrap();

        let second: Vec<u64> = rec
            .recommendations("me", 1)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(second, vec![101, 100]);
    }

    #[tokio::test]
    async fn test_store_failure_propagates_and_or_empty_swallows() {
        let mut store = MockProfileStore::new();
        store
            .expect_list_ratings()
            .returning(|_| Err(AppError::Internal("connection reset".to_string())));

        let rec = recommender(store, MockMetadataProvider::new());

        assert_err!(rec.recommendations("alice", 1).await);
        assert!(rec.recommendations_or_empty("alice", 1).await.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_movie()
            .returning(|_| Err(AppError::ExternalApi("TMDB returned status 503".to_string())));
        provider.expect_name().return_const("mock");

        let rec = recommender(taste_store().await, provider);

        let result = rec.recommendations("alice", 1).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));

        let genres = rec.genre_recommendations("alice").await;
        assert!(matches!(genres, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_genre_recommendations_ordered_by_mean() {
        let store = MemoryProfileStore::with_ratings(vec![
            rating("alice", "238", RatingLabel::Great),
            rating("alice", "680", RatingLabel::Good),
            rating("alice", "13", RatingLabel::Nooo),
        ])
        .await;

        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_movie().returning(|id| {
            Ok(match id {
                "238" => movie(238, &[(18, "Drama"), (80, "Crime")]),
                "680" => movie(680, &[(53, "Thriller"), (80, "Crime")]),
                _ => movie(13, &[(18, "Drama"), (35, "Comedy")]),
            })
        });
        provider.expect_name().return_const("mock");

        let rec = recommender(store, provider);
        let genres = rec.genre_recommendations("alice").await.unwrap();

        let order: Vec<&str> = genres.iter().map(|g| g.genre_name.as_str()).collect();
        // Crime 4.5 (2), Thriller 4.0, Drama 3.0, Comedy 1.0
        assert_eq!(order, vec!["Crime", "Thriller", "Drama", "Comedy"]);
        assert_eq!(genres[0].rated_count, 2);
        assert!((genres[0].mean_score - 4.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_genre_recommendations_for_unrated_user_is_empty() {
        let rec = recommender(MemoryProfileStore::new(), MockMetadataProvider::new());
        let genres = rec.genre_recommendations("ghost").await.unwrap();
        assert!(genres.is_empty());
    }

    #[test]
    fn test_rank_candidates_mean_and_order() {
        let own = map(&[("238", 5)]);
        let bob = map(&[("238", 5), ("550", 5), ("155", 4)]);
        let carol = map(&[("550", 3), ("278", 4)]);

        let ranked = rank_candidates(&own, &[&bob, &carol]);
        let ids: Vec<&str> = ranked.iter().map(|c| c.movie_id.as_str()).collect();

        // 550 = (5 + 3) / 2 = 4.0 with two contributors beats 155 and 278 at 4.0 with one
        assert_eq!(ids, vec!["550", "155", "278"]);
        assert_eq!(ranked[0].contributing_user_count, 2);
        assert!((ranked[0].aggregate_score - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_candidates_never_includes_own_movies() {
        let own = map(&[("1", 1), ("2", 5)]);
        let other = map(&[("1", 5), ("2", 5), ("3", 2)]);
        let ranked = rank_candidates(&own, &[&other]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].movie_id, "3");
    }

    #[test]
    fn test_paginate() {
        let items: Vec<usize> = (1..=45).collect();
        assert_eq!(paginate(&items, 1, 20), &items[0..20]);
        assert_eq!(paginate(&items, 2, 20), &items[20..40]);
        assert_eq!(paginate(&items, 3, 20), &items[40..45]);
        assert!(paginate(&items, 4, 20).is_empty());
        assert!(paginate(&items, usize::MAX, 20).is_empty());
    }
}
