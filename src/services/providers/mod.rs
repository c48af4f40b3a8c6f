/// Movie metadata provider abstraction
///
/// The coordinator only talks to metadata sources through this trait, which keeps it
/// testable without a network and leaves room for a different catalogue than TMDB.
use crate::{
    error::AppResult,
    models::{
        CastMember, DiscoverFilters, DiscoverQuery, Genre, Movie, MovieDetail, MovieImage,
        MoviePage, SectionKind, Video,
    },
};

pub mod tmdb;

pub use tmdb::{TmdbProvider, MISSING_API_KEY_MESSAGE};

/// Trait for movie metadata providers
///
/// Every method fails with `AppError::Network` when the transport fails and with
/// `AppError::Upstream` when the API answers with a non-success status.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Free-text search; only the filters the search endpoint understands are applied
    async fn search_movies(
        &self,
        term: &str,
        filters: &DiscoverFilters,
        page: u32,
    ) -> AppResult<MoviePage>;

    /// Filtered, sorted listing
    async fn discover_movies(&self, filters: &DiscoverFilters, page: u32) -> AppResult<MoviePage>;

    /// First page of a named home row
    async fn section(&self, kind: SectionKind) -> AppResult<Vec<Movie>>;

    async fn genres(&self) -> AppResult<Vec<Genre>>;

    async fn movie_detail(&self, movie_id: i64) -> AppResult<MovieDetail>;

    async fn videos(&self, movie_id: i64) -> AppResult<Vec<Video>>;

    async fn credits(&self, movie_id: i64) -> AppResult<Vec<CastMember>>;

    async fn images(&self, movie_id: i64) -> AppResult<Vec<MovieImage>>;

    async fn similar(&self, movie_id: i64) -> AppResult<Vec<Movie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fetches one page for a query, choosing search or discover by its term
pub async fn fetch_query_page(
    provider: &dyn MovieProvider,
    query: &DiscoverQuery,
    page: u32,
) -> AppResult<MoviePage> {
    if query.is_search() {
        provider.search_movies(&query.term, &query.filters, page).await
    } else {
        provider.discover_movies(&query.filters, page).await
    }
}
