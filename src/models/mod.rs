use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};

pub mod filters;
pub mod movie;
pub mod watchlist;

pub use filters::{DiscoverFilters, DiscoverQuery, SortBy};
pub use movie::{image_url, Genre, GenreMap, Movie, WatchlistMovie};
pub use watchlist::{Session, WatchlistEntry};

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of a TMDB list endpoint
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MoviePage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u32>,
}

fn first_page() -> u32 {
    1
}

/// Response from GET /genre/movie/list
#[derive(Debug, Clone, Deserialize)]
pub struct GenreListResponse {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Response from GET /movie/{id}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "movie::deserialize_release_date")]
    pub release_date: Option<NaiveDate>,
}

/// Response from GET /movie/{id}/credits
#[derive(Debug, Clone, Deserialize)]
pub struct CreditsResponse {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Response from GET /movie/{id}/images
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub backdrops: Vec<MovieImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieImage {
    pub file_path: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Response from GET /movie/{id}/videos
#[derive(Debug, Clone, Deserialize)]
pub struct VideosResponse {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: Option<bool>,
}

/// Everything shown in the details view for one movie
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieDetails {
    pub movie: MovieDetail,
    pub cast: Vec<CastMember>,
    pub images: Vec<MovieImage>,
    pub videos: Vec<Video>,
    pub similar: Vec<Movie>,
}

/// A resolved trailer link for a movie
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Trailer {
    pub movie_id: i64,
    pub url: String,
}

// ============================================================================
// Home Sections
// ============================================================================

/// Named rows on the home view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Trending,
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Trending,
        SectionKind::Popular,
        SectionKind::TopRated,
        SectionKind::NowPlaying,
        SectionKind::Upcoming,
    ];

    /// TMDB path serving this section
    pub fn path(&self) -> &'static str {
        match self {
            SectionKind::Trending => "/trending/movie/week",
            SectionKind::Popular => "/movie/popular",
            SectionKind::TopRated => "/movie/top_rated",
            SectionKind::NowPlaying => "/movie/now_playing",
            SectionKind::Upcoming => "/movie/upcoming",
        }
    }
}

impl Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SectionKind::Trending => "trending",
            SectionKind::Popular => "popular",
            SectionKind::TopRated => "top_rated",
            SectionKind::NowPlaying => "now_playing",
            SectionKind::Upcoming => "upcoming",
        };
        write!(f, "{}", label)
    }
}

/// Home rows plus the genre list, always committed together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeSections {
    pub sections: BTreeMap<SectionKind, Vec<Movie>>,
    pub genres: Vec<Genre>,
}

impl HomeSections {
    pub fn section(&self, kind: SectionKind) -> &[Movie] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ============================================================================
// Recommendation Service Types
// ============================================================================

/// Body of POST /api/recommendations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRequest {
    pub movie_title: String,
    pub num_recommendations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedMovie {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub similarity_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub input_movie: String,
    #[serde(default)]
    pub recommendations: Vec<RecommendedMovie>,
}

/// Error body returned by the recommendation service on non-2xx
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
}
