use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// A movie as returned by list endpoints (search, discover, trending, similar)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_release_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl Movie {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            backdrop_path: None,
            vote_average: None,
            release_date: None,
            overview: None,
            genre_ids: Vec::new(),
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }

    /// Poster URL at the given size ("w185", "w342", "w500", "original")
    pub fn poster_url(&self, size: &str) -> Option<String> {
        self.poster_path.as_deref().map(|path| image_url(path, size))
    }

    pub fn backdrop_url(&self, size: &str) -> Option<String> {
        self.backdrop_path.as_deref().map(|path| image_url(path, size))
    }
}

pub fn image_url(path: &str, size: &str) -> String {
    format!("{}/{}{}", TMDB_IMAGE_BASE, size, path)
}

/// TMDB sends `""` for unknown release dates; treat that and any unparsable value as absent
pub(crate) fn deserialize_release_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Genre id to name lookup, built once from the genre list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreMap(HashMap<i64, String>);

impl GenreMap {
    pub fn name(&self, id: i64) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    /// Names for a movie's genre ids, skipping unknown ids
    pub fn names_for(&self, movie: &Movie) -> Vec<&str> {
        movie.genre_ids.iter().filter_map(|id| self.name(*id)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[Genre]> for GenreMap {
    fn from(genres: &[Genre]) -> Self {
        // Later duplicates overwrite earlier ones, keeping keys unique
        Self(
            genres
                .iter()
                .map(|genre| (genre.id, genre.name.clone()))
                .collect(),
        )
    }
}

/// The subset of a movie persisted in a watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
}

impl From<&Movie> for WatchlistMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            backdrop_path: movie.backdrop_path.clone(),
            vote_average: movie.vote_average,
            overview: movie.overview.clone(),
        }
    }
}
