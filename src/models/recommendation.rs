use serde::{Deserialize, Serialize};

/// Correlation between the caller and one other user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityScore {
    pub user_id: String,
    pub correlation: f64,
}

/// A movie one or more similar users rated that the caller has not
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationCandidate {
    pub movie_id: String,
    /// Mean of the contributing users' scores
    pub aggregate_score: f64,
    pub contributing_user_count: usize,
}

/// Mean score the caller gave movies of one genre
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreScore {
    pub genre_id: u64,
    pub genre_name: String,
    pub mean_score: f64,
    pub rated_count: usize,
}
