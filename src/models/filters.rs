use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

/// Sort keys accepted by the discover endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SortBy {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "release_date.desc")]
    ReleaseDateDesc,
    #[serde(rename = "revenue.desc")]
    RevenueDesc,
    #[serde(rename = "primary_release_date.asc")]
    PrimaryReleaseDateAsc,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PopularityDesc => "popularity.desc",
            SortBy::VoteAverageDesc => "vote_average.desc",
            SortBy::ReleaseDateDesc => "release_date.desc",
            SortBy::RevenueDesc => "revenue.desc",
            SortBy::PrimaryReleaseDateAsc => "primary_release_date.asc",
        }
    }
}

impl Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter and sort selections for discover queries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscoverFilters {
    pub genre: Option<i64>,
    pub sort_by: SortBy,
    pub year: Option<i32>,
    pub min_rating: f64,
    pub language: Option<String>,
    pub region: Option<String>,
    pub include_adult: bool,
}

impl DiscoverFilters {
    /// Returns a copy with the rating clamped and the locale codes checked and normalized
    pub fn normalized(mut self) -> AppResult<Self> {
        self.min_rating = if self.min_rating.is_finite() {
            self.min_rating.max(0.0)
        } else {
            0.0
        };
        self.language = normalize_code(self.language, "language")?.map(|c| c.to_lowercase());
        self.region = normalize_code(self.region, "region")?.map(|c| c.to_uppercase());
        Ok(self)
    }

    /// Query parameters for `/discover/movie`, excluding `page`
    pub fn discover_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort_by", self.sort_by.to_string()),
            ("include_adult", self.include_adult.to_string()),
        ];

        if let Some(genre) = self.genre {
            params.push(("with_genres", genre.to_string()));
        }
        if let Some(year) = self.year {
            params.push(("primary_release_year", year.to_string()));
        }
        if self.min_rating > 0.0 {
            params.push(("vote_average.gte", self.min_rating.to_string()));
        }
        if let Some(language) = &self.language {
            params.push(("with_original_language", language.clone()));
        }
        if let Some(region) = &self.region {
            params.push(("region", region.clone()));
        }

        params
    }

    /// Query parameters that also apply to `/search/movie`.
    ///
    /// Genre, sort and minimum rating are not supported by the search endpoint.
    pub fn search_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("include_adult", self.include_adult.to_string())];

        if let Some(year) = self.year {
            params.push(("primary_release_year", year.to_string()));
        }
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        if let Some(region) = &self.region {
            params.push(("region", region.clone()));
        }

        params
    }
}

fn normalize_code(code: Option<String>, field: &str) -> AppResult<Option<String>> {
    match code.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(c) if c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => {
            Ok(Some(c.to_string()))
        }
        Some(c) => Err(AppError::InvalidInput(format!(
            "{} must be a two-letter code, got '{}'",
            field, c
        ))),
    }
}

/// The identity a result set is keyed to: free-text term plus filters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DiscoverQuery {
    pub term: String,
    pub filters: DiscoverFilters,
}

impl DiscoverQuery {
    pub fn new(term: impl Into<String>, filters: DiscoverFilters) -> Self {
        Self {
            term: term.into().trim().to_string(),
            filters,
        }
    }

    /// A non-empty term selects the search endpoint instead of discover
    pub fn is_search(&self) -> bool {
        !self.term.is_empty()
    }
}
