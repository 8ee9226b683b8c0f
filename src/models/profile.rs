use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display, str::FromStr};

use crate::error::AppError;

/// Score per movie id for a single user
pub type UserRatingMap = HashMap<String, u8>;

/// The five reactions a user can give a movie
///
/// Scores are deliberately not ordered by sentiment: THINKING (3) sits above MEH (2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingLabel {
    #[serde(rename = "GREAT!")]
    Great,
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "MEH")]
    Meh,
    #[serde(rename = "NOOO")]
    Nooo,
    #[serde(rename = "THINKING")]
    Thinking,
}

impl RatingLabel {
    pub const ALL: [RatingLabel; 5] = [
        RatingLabel::Great,
        RatingLabel::Good,
        RatingLabel::Meh,
        RatingLabel::Nooo,
        RatingLabel::Thinking,
    ];

    /// Integer score used by the similarity computation
    pub fn score(self) -> u8 {
        match self {
            RatingLabel::Great => 5,
            RatingLabel::Good => 4,
            RatingLabel::Thinking => 3,
            RatingLabel::Meh => 2,
            RatingLabel::Nooo => 1,
        }
    }

    /// Label as stored and sent over the wire
    pub fn as_str(self) -> &'static str {
        match self {
            RatingLabel::Great => "GREAT!",
            RatingLabel::Good => "GOOD",
            RatingLabel::Meh => "MEH",
            RatingLabel::Nooo => "NOOO",
            RatingLabel::Thinking => "THINKING",
        }
    }
}

impl Display for RatingLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RatingLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown rating label: {}", s)))
    }
}

/// A single user's rating of a single movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: String,
    /// TMDB movie id in decimal form
    pub movie_id: String,
    pub label: RatingLabel,
    pub rated_at: DateTime<Utc>,
}

impl Rating {
    pub fn new(user_id: String, movie_id: String, label: RatingLabel) -> Self {
        Self {
            user_id,
            movie_id,
            label,
            rated_at: Utc::now(),
        }
    }

    pub fn score(&self) -> u8 {
        self.label.score()
    }
}

/// Collapses rating records into the movie id → score map the recommender works on
pub fn to_rating_map(ratings: &[Rating]) -> UserRatingMap {
    ratings
        .iter()
        .map(|r| (r.movie_id.clone(), r.score()))
        .collect()
}

/// Per-user movie lists kept next to the ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Watchlist,
    Favorites,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Watchlist => "watchlist",
            ListKind::Favorites => "favorites",
        }
    }
}

impl Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
