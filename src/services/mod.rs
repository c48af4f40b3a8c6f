pub mod providers;
pub mod recommendations;
pub mod trailer;

pub use providers::{MovieProvider, TmdbProvider};
pub use recommendations::{RecommendationClient, Recommender};
