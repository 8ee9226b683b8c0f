mod movie;
mod profile;
mod recommendation;

pub use movie::{Genre, MovieDetails, MovieSearchPage, MovieSummary};
pub use profile::{to_rating_map, ListKind, Rating, RatingLabel, UserRatingMap};
pub use recommendation::{GenreScore, RecommendationCandidate, SimilarityScore};
