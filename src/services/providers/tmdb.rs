/// TMDB API provider
///
/// Read-only client for the movie metadata API. The key travels as the `api_key`
/// query parameter on every request; a missing key fails each call with
/// `AppError::Config` so the home view can report it instead of silently showing nothing.
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        CastMember, CreditsResponse, DiscoverFilters, Genre, GenreListResponse, ImagesResponse,
        Movie, MovieDetail, MovieImage, MoviePage, SectionKind, Video, VideosResponse,
    },
    services::providers::MovieProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

/// Shown in place of the home view when no usable key is configured
pub const MISSING_API_KEY_MESSAGE: &str =
    "TMDB API key is not configured. Set TMDB_API_KEY to load movies.";

impl TmdbProvider {
    /// Creates a provider with the configured key, base URL and request timeout
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http_client,
            api_key: config.api_key().map(str::to_string),
            api_url: config.tmdb_api_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Config(MISSING_API_KEY_MESSAGE.to_string()))
    }

    /// GET `path` with `params` plus the API key and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Config(
                "TMDB rejected the API key. Check TMDB_API_KEY.".to_string(),
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path = %path, status = %status, "TMDB request failed");
            return Err(AppError::upstream(
                status,
                format!("TMDB API returned status {}: {}", status, body),
            ));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::Decode(e)
        })
    }
}

#[async_trait::async_trait]
impl MovieProvider for TmdbProvider {
    async fn search_movies(
        &self,
        term: &str,
        filters: &DiscoverFilters,
        page: u32,
    ) -> AppResult<MoviePage> {
        if term.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let mut params = vec![("query", term.to_string()), ("page", page.to_string())];
        params.extend(filters.search_params());

        let results: MoviePage = self.get_json("/search/movie", &params).await?;

        tracing::info!(
            query = %term,
            page = page,
            results = results.results.len(),
            provider = "tmdb",
            "Movie search completed"
        );

        Ok(results)
    }

    async fn discover_movies(&self, filters: &DiscoverFilters, page: u32) -> AppResult<MoviePage> {
        let mut params = vec![("page", page.to_string())];
        params.extend(filters.discover_params());

        let results: MoviePage = self.get_json("/discover/movie", &params).await?;

        tracing::info!(
            sort_by = %filters.sort_by,
            genre = ?filters.genre,
            page = page,
            results = results.results.len(),
            provider = "tmdb",
            "Discover query completed"
        );

        Ok(results)
    }

    async fn section(&self, kind: SectionKind) -> AppResult<Vec<Movie>> {
        let page: MoviePage = self.get_json(kind.path(), &[]).await?;
        tracing::debug!(section = %kind, results = page.results.len(), "Section fetched");
        Ok(page.results)
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        let response: GenreListResponse = self.get_json("/genre/movie/list", &[]).await?;
        Ok(response.genres)
    }

    async fn movie_detail(&self, movie_id: i64) -> AppResult<MovieDetail> {
        self.get_json(&format!("/movie/{}", movie_id), &[]).await
    }

    async fn videos(&self, movie_id: i64) -> AppResult<Vec<Video>> {
        let response: VideosResponse = self
            .get_json(&format!("/movie/{}/videos", movie_id), &[])
            .await?;
        Ok(response.results)
    }

    async fn credits(&self, movie_id: i64) -> AppResult<Vec<CastMember>> {
        let response: CreditsResponse = self
            .get_json(&format!("/movie/{}/credits", movie_id), &[])
            .await?;
        Ok(response.cast)
    }

    async fn images(&self, movie_id: i64) -> AppResult<Vec<MovieImage>> {
        let response: ImagesResponse = self
            .get_json(&format!("/movie/{}/images", movie_id), &[])
            .await?;
        Ok(response.backdrops)
    }

    async fn similar(&self, movie_id: i64) -> AppResult<Vec<Movie>> {
        let page: MoviePage = self
            .get_json(&format!("/movie/{}/similar", movie_id), &[])
            .await?;
        Ok(page.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
