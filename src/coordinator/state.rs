use crate::models::{
    DiscoverFilters, DiscoverQuery, GenreMap, HomeSections, Movie, MovieDetails,
    RecommendationResponse, SectionKind, Session, Trailer, WatchlistEntry,
};

pub const DISCOVER_FAILED_MESSAGE: &str = "Unable to fetch movies right now. Please try again.";
pub const HOME_FAILED_MESSAGE: &str = "Unable to load movies right now. Please try again.";
pub const TRAILER_UNAVAILABLE_MESSAGE: &str = "Trailer unavailable for this title.";
pub const BLANK_TITLE_MESSAGE: &str = "Please enter a movie title";

/// Lifecycle of one fetch class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// The movie open in the details view
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedMovie {
    pub movie_id: i64,
    pub details: Option<MovieDetails>,
    pub loading: bool,
}

/// Recommendations for the last requested title
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations {
    pub input_movie: String,
    pub items: Vec<crate::models::RecommendedMovie>,
}

/// Everything the presentation renders.
///
/// A new value is produced for every event by [`reduce`]; nothing mutates a published
/// state in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub raw_term: String,
    pub debounced_term: String,
    pub filters: DiscoverFilters,
    /// Query the visible results belong to; responses for any other query are dropped
    pub active_query: DiscoverQuery,
    pub page: u32,
    pub page_size: usize,
    pub results: Vec<Movie>,
    /// Rows received for the active query, repeats included
    pub fetched_count: usize,
    pub discover_status: FetchStatus,
    pub loading_more: bool,

    pub home: HomeSections,
    pub genre_map: GenreMap,
    pub home_status: FetchStatus,
    pub home_generation: u64,
    /// Generation of the committed trending pool the featured index walks
    pub pool_generation: u64,
    pub featured_index: usize,

    pub session: Session,
    pub watchlist: Vec<WatchlistEntry>,
    pub watchlist_status: FetchStatus,
    pub auth_prompt: bool,

    pub selected: Option<SelectedMovie>,
    pub trailer_request: Option<i64>,
    pub active_trailer: Option<Trailer>,

    pub recommendation_title: Option<String>,
    pub recommendations: Option<Recommendations>,
    pub recommendations_status: FetchStatus,

    pub error_message: Option<String>,
    pub fatal_error: Option<String>,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            raw_term: String::new(),
            debounced_term: String::new(),
            filters: DiscoverFilters::default(),
            active_query: DiscoverQuery::default(),
            page: 1,
            page_size: page_size.max(1),
            results: Vec::new(),
            fetched_count: 0,
            discover_status: FetchStatus::Idle,
            loading_more: false,
            home: HomeSections::default(),
            genre_map: GenreMap::default(),
            home_status: FetchStatus::Idle,
            home_generation: 0,
            pool_generation: 0,
            featured_index: 0,
            session: Session::guest(),
            watchlist: Vec::new(),
            watchlist_status: FetchStatus::Idle,
            auth_prompt: false,
            selected: None,
            trailer_request: None,
            active_trailer: None,
            recommendation_title: None,
            recommendations: None,
            recommendations_status: FetchStatus::Idle,
            error_message: None,
            fatal_error: None,
        }
    }

    /// A full last page suggests another one exists.
    ///
    /// Counts rows as received, so ids TMDB repeats across pages do not end paging early.
    pub fn has_more(&self) -> bool {
        self.fetched_count >= self.page as usize * self.page_size
    }

    pub fn watchlist_entry(&self, movie_id: i64) -> Option<&WatchlistEntry> {
        self.watchlist.iter().find(|entry| entry.movie.id == movie_id)
    }

    pub fn is_in_watchlist(&self, movie_id: i64) -> bool {
        self.watchlist_entry(movie_id).is_some()
    }

    pub fn trending_pool(&self) -> &[Movie] {
        self.home.section(SectionKind::Trending)
    }

    /// The movie currently shown in the featured slot
    pub fn featured(&self) -> Option<&Movie> {
        self.trending_pool().get(self.featured_index)
    }
}

/// State transitions
#[derive(Debug, Clone)]
pub enum Event {
    SearchTermChanged(String),
    DebouncedTermCommitted(String),
    FiltersChanged(DiscoverFilters),

    DiscoverStarted { query: DiscoverQuery },
    DiscoverLoaded { query: DiscoverQuery, movies: Vec<Movie> },
    DiscoverFailed { query: DiscoverQuery, message: String },
    LoadMoreStarted { query: DiscoverQuery },
    LoadMoreLoaded { query: DiscoverQuery, page: u32, movies: Vec<Movie> },
    LoadMoreFailed { query: DiscoverQuery, message: String },
    LoadMoreCancelled,

    HomeStarted { generation: u64 },
    HomeLoaded { generation: u64, home: HomeSections },
    HomeFailed { generation: u64, message: String },
    FeaturedAdvanced { pool_generation: u64 },

    SessionChanged(Session),
    AuthPromptRequested,
    AuthPromptDismissed,
    WatchlistLoading { owner_id: String },
    WatchlistLoaded { owner_id: String, entries: Vec<WatchlistEntry> },
    WatchlistFailed { owner_id: String, message: String },
    WatchlistInserted(WatchlistEntry),
    WatchlistRemoved { owner_id: String, movie_id: i64 },
    WatchlistConfirmed(WatchlistEntry),

    DetailsRequested { movie_id: i64 },
    DetailsLoaded(MovieDetails),
    DetailsFailed { movie_id: i64, message: String },
    DetailsClosed,

    TrailerRequested { movie_id: i64 },
    TrailerResolved(Trailer),
    TrailerUnavailable { movie_id: i64, message: String },
    TrailerClosed,

    RecommendationsStarted { title: String },
    RecommendationsLoaded { title: String, response: RecommendationResponse },
    RecommendationsFailed { title: Option<String>, message: String },

    ErrorRaised(String),
    ErrorDismissed,
    FatalError(String),
}

impl Event {
    /// Whether this event still belongs to what the state is showing.
    ///
    /// Responses carry the key they were requested for; once the state has moved on to
    /// another query, generation, selection or owner they are rejected unchanged.
    pub fn applies_to(&self, state: &ViewState) -> bool {
        match self {
            Event::DiscoverLoaded { query, .. }
            | Event::DiscoverFailed { query, .. }
            | Event::LoadMoreStarted { query }
            | Event::LoadMoreLoaded { query, .. }
            | Event::LoadMoreFailed { query, .. } => *query == state.active_query,
            Event::HomeLoaded { generation, .. } | Event::HomeFailed { generation, .. } => {
                *generation == state.home_generation
            }
            Event::FeaturedAdvanced { pool_generation } => {
                *pool_generation == state.pool_generation && !state.trending_pool().is_empty()
            }
            Event::WatchlistLoading { owner_id }
            | Event::WatchlistLoaded { owner_id, .. }
            | Event::WatchlistFailed { owner_id, .. }
            | Event::WatchlistRemoved { owner_id, .. } => {
                state.session.user_id.as_deref() == Some(owner_id.as_str())
            }
            Event::WatchlistInserted(entry) | Event::WatchlistConfirmed(entry) => {
                state.session.user_id.as_deref() == Some(entry.owner_id.as_str())
            }
            Event::DetailsLoaded(details) => selected_id(state) == Some(details.movie.id),
            Event::DetailsFailed { movie_id, .. } => selected_id(state) == Some(*movie_id),
            Event::TrailerResolved(trailer) => state.trailer_request == Some(trailer.movie_id),
            Event::TrailerUnavailable { movie_id, .. } => state.trailer_request == Some(*movie_id),
            Event::RecommendationsLoaded { title, .. } => {
                state.recommendation_title.as_deref() == Some(title.as_str())
            }
            Event::RecommendationsFailed {
                title: Some(title), ..
            } => state.recommendation_title.as_deref() == Some(title.as_str()),
            _ => true,
        }
    }
}

fn selected_id(state: &ViewState) -> Option<i64> {
    state.selected.as_ref().map(|selected| selected.movie_id)
}

/// Pure state transition
pub fn reduce(state: &ViewState, event: Event) -> ViewState {
    if !event.applies_to(state) {
        return state.clone();
    }

    let mut next = state.clone();
    match event {
        Event::SearchTermChanged(term) => next.raw_term = term,
        Event::DebouncedTermCommitted(term) => next.debounced_term = term.trim().to_string(),
        Event::FiltersChanged(filters) => {
            next.filters = filters;
            next.results.clear();
            next.fetched_count = 0;
            next.page = 1;
        }

        Event::DiscoverStarted { query } => {
            next.debounced_term = query.term.clone();
            next.filters = query.filters.clone();
            next.active_query = query;
            next.discover_status = FetchStatus::Loading;
            next.loading_more = false;
            next.error_message = None;
        }
        Event::DiscoverLoaded { movies, .. } => {
            next.fetched_count = movies.len();
            next.results = dedup_movies(movies);
            next.page = 1;
            next.discover_status = FetchStatus::Success;
        }
        Event::DiscoverFailed { message, .. } => {
            next.results.clear();
            next.fetched_count = 0;
            next.page = 1;
            next.discover_status = FetchStatus::Failed;
            next.error_message = Some(message);
        }
        Event::LoadMoreStarted { .. } => next.loading_more = true,
        Event::LoadMoreLoaded { page, movies, .. } => {
            next.fetched_count += movies.len();
            for movie in movies {
                if !next.results.iter().any(|existing| existing.id == movie.id) {
                    next.results.push(movie);
                }
            }
            next.page = page;
            next.loading_more = false;
        }
        Event::LoadMoreFailed { message, .. } => {
            next.loading_more = false;
            next.error_message = Some(message);
        }
        Event::LoadMoreCancelled => next.loading_more = false,

        Event::HomeStarted { generation } => {
            next.home_generation = generation;
            next.home_status = FetchStatus::Loading;
        }
        Event::HomeLoaded { generation, home } => {
            next.genre_map = GenreMap::from(home.genres.as_slice());
            next.home = home;
            next.home_status = FetchStatus::Success;
            next.pool_generation = generation;
            next.featured_index = 0;
        }
        Event::HomeFailed { message, .. } => {
            next.home_status = FetchStatus::Failed;
            next.error_message = Some(message);
        }
        Event::FeaturedAdvanced { .. } => {
            next.featured_index = (state.featured_index + 1) % state.trending_pool().len();
        }

        Event::SessionChanged(session) => {
            if session.user_id != state.session.user_id {
                next.watchlist.clear();
                next.watchlist_status = FetchStatus::Idle;
            }
            if !session.is_guest() {
                next.auth_prompt = false;
            }
            next.session = session;
        }
        Event::AuthPromptRequested => next.auth_prompt = true,
        Event::AuthPromptDismissed => next.auth_prompt = false,
        Event::WatchlistLoading { .. } => next.watchlist_status = FetchStatus::Loading,
        Event::WatchlistLoaded { entries, .. } => {
            let mut merged = Vec::with_capacity(entries.len());
            for entry in entries {
                if !merged
                    .iter()
                    .any(|e: &WatchlistEntry| e.movie.id == entry.movie.id)
                {
                    merged.push(entry);
                }
            }
            // Optimistic adds the server has not confirmed yet stay visible
            for pending in state.watchlist.iter().filter(|e| e.is_pending()) {
                if !merged.iter().any(|e| e.movie.id == pending.movie.id) {
                    merged.insert(0, pending.clone());
                }
            }
            next.watchlist = merged;
            next.watchlist_status = FetchStatus::Success;
        }
        Event::WatchlistFailed { message, .. } => {
            next.watchlist_status = FetchStatus::Failed;
            next.error_message = Some(message);
        }
        Event::WatchlistInserted(entry) => {
            if !state.is_in_watchlist(entry.movie.id) {
                next.watchlist.insert(0, entry);
            }
        }
        Event::WatchlistRemoved { movie_id, .. } => {
            next.watchlist.retain(|entry| entry.movie.id != movie_id);
        }
        Event::WatchlistConfirmed(entry) => {
            match next
                .watchlist
                .iter_mut()
                .find(|existing| existing.movie.id == entry.movie.id)
            {
                // The store keeps a subset of the movie; the local payload stays
                Some(existing) => existing.remote_document_id = entry.remote_document_id,
                None => next.watchlist.insert(0, entry),
            }
        }

        Event::DetailsRequested { movie_id } => {
            next.selected = Some(SelectedMovie {
                movie_id,
                details: None,
                loading: true,
            });
        }
        Event::DetailsLoaded(details) => {
            next.selected = Some(SelectedMovie {
                movie_id: details.movie.id,
                details: Some(details),
                loading: false,
            });
        }
        Event::DetailsFailed { movie_id, message } => {
            next.selected = Some(SelectedMovie {
                movie_id,
                details: None,
                loading: false,
            });
            next.error_message = Some(message);
        }
        Event::DetailsClosed => next.selected = None,

        Event::TrailerRequested { movie_id } => {
            next.trailer_request = Some(movie_id);
            next.active_trailer = None;
        }
        Event::TrailerResolved(trailer) => {
            next.trailer_request = None;
            next.active_trailer = Some(trailer);
        }
        Event::TrailerUnavailable { message, .. } => {
            next.trailer_request = None;
            next.active_trailer = None;
            next.error_message = Some(message);
        }
        Event::TrailerClosed => {
            next.trailer_request = None;
            next.active_trailer = None;
        }

        Event::RecommendationsStarted { title } => {
            next.recommendation_title = Some(title);
            next.recommendations = None;
            next.recommendations_status = FetchStatus::Loading;
            next.error_message = None;
        }
        Event::RecommendationsLoaded { response, .. } => {
            next.recommendations = Some(Recommendations {
                input_movie: response.input_movie,
                items: response.recommendations,
            });
            next.recommendations_status = FetchStatus::Success;
        }
        Event::RecommendationsFailed { title, message } => {
            if title.is_none() {
                next.recommendation_title = None;
            }
            next.recommendations = None;
            next.recommendations_status = FetchStatus::Failed;
            next.error_message = Some(message);
        }

        Event::ErrorRaised(message) => next.error_message = Some(message),
        Event::ErrorDismissed => next.error_message = None,
        Event::FatalError(message) => next.fatal_error = Some(message),
    }
    next
}

fn dedup_movies(movies: Vec<Movie>) -> Vec<Movie> {
    let mut unique: Vec<Movie> = Vec::with_capacity(movies.len());
    for movie in movies {
        if !unique.iter().any(|existing| existing.id == movie.id) {
            unique.push(movie);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Genre, WatchlistMovie};

    fn movies(ids: std::ops::Range<i64>) -> Vec<Movie> {
        ids.map(|id| Movie::new(id, format!("Movie {}", id))).collect()
    }

    fn entry(movie_id: i64, document: Option<&str>) -> WatchlistEntry {
        WatchlistEntry {
            owner_id: "u1".to_string(),
            movie: WatchlistMovie::from(&Movie::new(movie_id, "Saved")),
            remote_document_id: document.map(str::to_string),
        }
    }

    fn searching(term: &str) -> (ViewState, DiscoverQuery) {
        let query = DiscoverQuery::new(term, DiscoverFilters::default());
        let state = reduce(
            &ViewState::new(20),
            Event::DiscoverStarted {
                query: query.clone(),
            },
        );
        (state, query)
    }

    #[test]
    fn test_has_more_tracks_full_pages() {
        let (state, query) = searching("");
        assert!(!state.has_more());

        let state = reduce(
            &state,
            Event::DiscoverLoaded {
                query: query.clone(),
                movies: movies(0..20),
            },
        );
        assert!(state.has_more());

        let state = reduce(
            &state,
            Event::LoadMoreLoaded {
                query,
                page: 2,
                movies: movies(20..35),
            },
        );
        assert_eq!(state.page, 2);
        assert_eq!(state.results.len(), 35);
        assert!(!state.has_more());
    }

    #[test]
    fn test_repeated_ids_do_not_end_paging() {
        let (state, query) = searching("");
        let mut first = movies(0..20);
        first[19] = Movie::new(3, "Repeat");
        let state = reduce(
            &state,
            Event::DiscoverLoaded {
                query: query.clone(),
                movies: first,
            },
        );
        assert_eq!(state.results.len(), 19);
        assert!(state.has_more());

        let mut second = movies(20..39);
        second.push(Movie::new(5, "Repeat"));
        let state = reduce(
            &state,
            Event::LoadMoreLoaded {
                query,
                page: 2,
                movies: second,
            },
        );

        assert_eq!(state.results.len(), 38);
        assert_eq!(state.fetched_count, 40);
        assert!(state.has_more());
    }

    #[test]
    fn test_discover_started_adopts_query_term_and_filters() {
        let filters = DiscoverFilters {
            genre: Some(18),
            ..DiscoverFilters::default()
        };
        let state = reduce(
            &ViewState::new(20),
            Event::DiscoverStarted {
                query: DiscoverQuery::new(" heat ", filters.clone()),
            },
        );

        assert_eq!(state.debounced_term, "heat");
        assert_eq!(state.filters, filters);
    }

    #[test]
    fn test_load_more_appends_without_duplicates() {
        let (state, query) = searching("alien");
        let state = reduce(
            &state,
            Event::DiscoverLoaded {
                query: query.clone(),
                movies: movies(0..20),
            },
        );
        let state = reduce(
            &state,
            Event::LoadMoreLoaded {
                query,
                page: 2,
                movies: movies(18..25),
            },
        );

        let ids: Vec<i64> = state.results.iter().map(|m| m.id).collect();
        assert_eq!(ids, (0..25).collect::<Vec<_>>());
        assert_eq!(state.page, 2);
    }

    #[test]
    fn test_stale_discover_response_is_ignored() {
        let (state, old_query) = searching("a");
        let new_query = DiscoverQuery::new("ab", DiscoverFilters::default());
        let state = reduce(
            &state,
            Event::DiscoverStarted {
                query: new_query.clone(),
            },
        );

        let stale = Event::DiscoverLoaded {
            query: old_query,
            movies: movies(0..3),
        };
        assert!(!stale.applies_to(&state));
        let after = reduce(&state, stale);
        assert_eq!(after, state);
    }

    #[test]
    fn test_discover_failure_clears_results() {
        let (state, query) = searching("");
        let state = reduce(
            &state,
            Event::DiscoverLoaded {
                query: query.clone(),
                movies: movies(0..5),
            },
        );
        let state = reduce(
            &state,
            Event::DiscoverFailed {
                query,
                message: DISCOVER_FAILED_MESSAGE.to_string(),
            },
        );

        assert!(state.results.is_empty());
        assert_eq!(state.discover_status, FetchStatus::Failed);
        assert_eq!(state.error_message.as_deref(), Some(DISCOVER_FAILED_MESSAGE));
    }

    #[test]
    fn test_home_commit_resets_featured_index() {
        let mut home = HomeSections::default();
        home.sections.insert(SectionKind::Trending, movies(0..3));
        home.genres = vec![Genre {
            id: 28,
            name: "Action".to_string(),
        }];

        let state = reduce(&ViewState::new(20), Event::HomeStarted { generation: 1 });
        let state = reduce(
            &state,
            Event::HomeLoaded {
                generation: 1,
                home: home.clone(),
            },
        );
        let state = reduce(&state, Event::FeaturedAdvanced { pool_generation: 1 });
        let state = reduce(&state, Event::FeaturedAdvanced { pool_generation: 1 });
        assert_eq!(state.featured_index, 2);
        let state = reduce(&state, Event::FeaturedAdvanced { pool_generation: 1 });
        assert_eq!(state.featured_index, 0);
        assert_eq!(state.genre_map.name(28), Some("Action"));

        let state = reduce(&state, Event::FeaturedAdvanced { pool_generation: 1 });
        let state = reduce(&state, Event::HomeStarted { generation: 2 });
        let state = reduce(&state, Event::HomeLoaded { generation: 2, home });
        assert_eq!(state.featured_index, 0);
        assert!(!Event::FeaturedAdvanced { pool_generation: 1 }.applies_to(&state));
    }

    #[test]
    fn test_home_failure_keeps_prior_sections() {
        let mut home = HomeSections::default();
        home.sections.insert(SectionKind::Popular, movies(0..2));
        let state = reduce(&ViewState::new(20), Event::HomeStarted { generation: 1 });
        let state = reduce(&state, Event::HomeLoaded { generation: 1, home });

        let state = reduce(&state, Event::HomeStarted { generation: 2 });
        let state = reduce(
            &state,
            Event::HomeFailed {
                generation: 2,
                message: HOME_FAILED_MESSAGE.to_string(),
            },
        );

        assert_eq!(state.home.section(SectionKind::Popular).len(), 2);
        assert_eq!(state.home_status, FetchStatus::Failed);
    }

    #[test]
    fn test_watchlist_insert_is_unique() {
        let state = reduce(
            &ViewState::new(20),
            Event::SessionChanged(Session::user("u1", None)),
        );
        let state = reduce(&state, Event::WatchlistInserted(entry(42, None)));
        let state = reduce(&state, Event::WatchlistInserted(entry(42, None)));
        assert_eq!(state.watchlist.len(), 1);

        let state = reduce(&state, Event::WatchlistConfirmed(entry(42, Some("doc-1"))));
        assert_eq!(state.watchlist.len(), 1);
        assert!(!state.watchlist[0].is_pending());
    }

    #[test]
    fn test_confirm_keeps_local_movie_details() {
        let state = reduce(
            &ViewState::new(20),
            Event::SessionChanged(Session::user("u1", None)),
        );
        let mut local = entry(42, None);
        local.movie.backdrop_path = Some("/backdrop.jpg".to_string());
        local.movie.vote_average = Some(7.9);
        local.movie.overview = Some("A heist.".to_string());
        let state = reduce(&state, Event::WatchlistInserted(local.clone()));

        let state = reduce(&state, Event::WatchlistConfirmed(entry(42, Some("doc-9"))));

        let saved = &state.watchlist[0];
        assert_eq!(saved.remote_document_id.as_deref(), Some("doc-9"));
        assert_eq!(saved.movie, local.movie);
    }

    #[test]
    fn test_removal_for_previous_owner_is_ignored() {
        let state = reduce(
            &ViewState::new(20),
            Event::SessionChanged(Session::user("u2", None)),
        );
        let mut theirs = entry(42, Some("d2"));
        theirs.owner_id = "u2".to_string();
        let state = reduce(
            &state,
            Event::WatchlistLoaded {
                owner_id: "u2".to_string(),
                entries: vec![theirs],
            },
        );

        let stale = Event::WatchlistRemoved {
            owner_id: "u1".to_string(),
            movie_id: 42,
        };
        assert!(!stale.applies_to(&state));
        let state = reduce(&state, stale);
        assert!(state.is_in_watchlist(42));

        let state = reduce(
            &state,
            Event::WatchlistRemoved {
                owner_id: "u2".to_string(),
                movie_id: 42,
            },
        );
        assert!(!state.is_in_watchlist(42));
    }

    #[test]
    fn test_watchlist_load_keeps_pending_adds() {
        let state = reduce(
            &ViewState::new(20),
            Event::SessionChanged(Session::user("u1", None)),
        );
        let state = reduce(&state, Event::WatchlistInserted(entry(7, None)));
        let state = reduce(
            &state,
            Event::WatchlistLoaded {
                owner_id: "u1".to_string(),
                entries: vec![entry(1, Some("d1")), entry(1, Some("d1-dup"))],
            },
        );

        let ids: Vec<i64> = state.watchlist.iter().map(WatchlistEntry::movie_id).collect();
        assert_eq!(ids, vec![7, 1]);
    }

    #[test]
    fn test_watchlist_load_for_previous_owner_is_ignored() {
        let state = reduce(
            &ViewState::new(20),
            Event::SessionChanged(Session::user("u2", None)),
        );
        let event = Event::WatchlistLoaded {
            owner_id: "u1".to_string(),
            entries: vec![entry(1, Some("d1"))],
        };
        assert!(!event.applies_to(&state));
    }

    #[test]
    fn test_guest_cannot_hold_entries() {
        let state = ViewState::new(20);
        assert!(!Event::WatchlistInserted(entry(1, None)).applies_to(&state));
    }

    #[test]
    fn test_logout_clears_watchlist() {
        let state = reduce(
            &ViewState::new(20),
            Event::SessionChanged(Session::user("u1", None)),
        );
        let state = reduce(&state, Event::WatchlistInserted(entry(3, Some("d3"))));
        let state = reduce(&state, Event::SessionChanged(Session::guest()));
        assert!(state.watchlist.is_empty());
        assert!(state.session.is_guest());
    }

    #[test]
    fn test_details_for_other_movie_are_dropped() {
        let state = reduce(&ViewState::new(20), Event::DetailsRequested { movie_id: 1 });
        let state = reduce(&state, Event::DetailsRequested { movie_id: 2 });
        let late = Event::DetailsFailed {
            movie_id: 1,
            message: "boom".to_string(),
        };
        assert!(!late.applies_to(&state));
        assert!(reduce(&state, Event::DetailsClosed).selected.is_none());
    }

    #[test]
    fn test_trailer_lifecycle() {
        let state = reduce(&ViewState::new(20), Event::TrailerRequested { movie_id: 5 });
        let state = reduce(
            &state,
            Event::TrailerResolved(Trailer {
                movie_id: 5,
                url: "https://www.youtube.com/watch?v=abc".to_string(),
            }),
        );
        assert!(state.active_trailer.is_some());
        assert!(reduce(&state, Event::TrailerClosed).active_trailer.is_none());
    }
}
