pub mod providers;
pub mod ratings;
pub mod recommendations;
pub mod similarity;

pub use providers::{MetadataProvider, TmdbProvider};
pub use recommendations::{Recommender, RecommenderSettings};
