use serde::{Deserialize, Serialize};

/// TMDB genre
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Movie record as resolved by the metadata provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl MovieDetails {
    /// Full poster URL, if the movie has a poster
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{}{}", image_base_url.trim_end_matches('/'), path))
    }

    /// Four-digit release year parsed from the release date
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

#[cfg(test)]
impl MovieDetails {
    /// Bare movie with a placeholder title and nothing else set
    pub(crate) fn stub(id: u64) -> Self {
        Self {
            id,
            title: format!("Movie {}", id),
            overview: None,
            poster_path: None,
            release_date: None,
            vote_average: None,
            genres: vec![],
        }
    }
}

/// Search hit; TMDB only returns genre ids in search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
}

/// One page of TMDB search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSearchPage {
    pub page: u32,
    pub results: Vec<MovieSummary>,
    pub total_pages: u32,
    pub total_results: u64,
}
