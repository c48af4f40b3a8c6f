//! View-state coordination.
//!
//! [`Coordinator`] owns the single [`ViewState`] and every operation the presentation
//! can trigger. Operations never return errors: failures become messages in the state,
//! and the return value only reports what happened to the result.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        DiscoverFilters, DiscoverQuery, Genre, HomeSections, Movie, MovieDetails,
        RecommendationRequest, SectionKind, Session, Trailer, WatchlistEntry, WatchlistMovie,
    },
    services::{
        providers::{fetch_query_page, MovieProvider, TmdbProvider, MISSING_API_KEY_MESSAGE},
        recommendations::{RecommendationClient, Recommender, DEFAULT_RECOMMENDATION_COUNT},
        trailer::{resolve_trailer, youtube_url},
    },
    store::{build_backend, AuthProvider, StoreBackend, WatchlistStore},
};

pub mod debounce;
pub mod observable;
pub mod optimistic;
pub mod rotation;
pub mod state;


pub use debounce::Debouncer;
pub use observable::StateContainer;
pub use optimistic::OptimisticMutation;
pub use state::{reduce, Event, FetchStatus, Recommendations, SelectedMovie, ViewState};

use state::{
    BLANK_TITLE_MESSAGE, DISCOVER_FAILED_MESSAGE, HOME_FAILED_MESSAGE,
    TRAILER_UNAVAILABLE_MESSAGE,
};

/// What happened to the result of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result is now visible
    Committed,
    /// The result arrived after its request was superseded and was dropped
    Discarded,
    /// The fetch failed; the state carries the message
    Failed,
    /// Nothing was fetched
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// No session; the auth prompt was raised instead
    AuthRequired,
    /// A toggle for the same movie is still running
    Busy,
    Failed,
}

/// Timing and paging knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub search_debounce: Duration,
    pub featured_rotation: Duration,
    pub page_size: usize,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(450),
            featured_rotation: Duration::from_secs(9),
            page_size: 20,
        }
    }
}

impl From<&Config> for CoordinatorSettings {
    fn from(config: &Config) -> Self {
        Self {
            search_debounce: config.search_debounce(),
            featured_rotation: config.featured_rotation(),
            page_size: config.page_size.max(1),
        }
    }
}

/// Called when a guest tries to change the watchlist
pub type AuthRequiredHook = Arc<dyn Fn() + Send + Sync>;

pub struct CoordinatorBuilder {
    provider: Arc<dyn MovieProvider>,
    backend: StoreBackend,
    recommender: Arc<dyn Recommender>,
    settings: CoordinatorSettings,
    on_auth_required: Option<AuthRequiredHook>,
}

impl CoordinatorBuilder {
    pub fn settings(mut self, settings: CoordinatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn on_auth_required(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_auth_required = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Coordinator {
        let container = Arc::new(StateContainer::new(ViewState::new(self.settings.page_size)));
        Coordinator {
            inner: Arc::new(Inner {
                container,
                provider: self.provider,
                store: self.backend.watchlist,
                auth: self.backend.auth,
                recommender: self.recommender,
                debouncer: Debouncer::new(self.settings.search_debounce),
                settings: self.settings,
                rotation: Mutex::new(None),
                tasks: Mutex::new(Vec::new()),
                load_more_in_flight: AtomicBool::new(false),
                toggles_in_flight: Mutex::new(HashSet::new()),
                home_generation: AtomicU64::new(0),
                verified_owner: Mutex::new(None),
                on_auth_required: self.on_auth_required,
            }),
        }
    }
}

struct Inner {
    container: Arc<StateContainer>,
    provider: Arc<dyn MovieProvider>,
    store: Arc<dyn WatchlistStore>,
    auth: Arc<dyn AuthProvider>,
    recommender: Arc<dyn Recommender>,
    settings: CoordinatorSettings,
    debouncer: Debouncer,
    rotation: Mutex<Option<JoinHandle<()>>>,
    tasks: Mutex<Vec<AbortHandle>>,
    load_more_in_flight: AtomicBool,
    toggles_in_flight: Mutex<HashSet<i64>>,
    home_generation: AtomicU64,
    /// Owner whose store permissions were checked; cleared on any session change
    verified_owner: Mutex<Option<String>>,
    on_auth_required: Option<AuthRequiredHook>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.rotation).take() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Clears an in-flight flag when dropped
struct InFlightFlag<'a>(&'a AtomicBool);

impl<'a> InFlightFlag<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Membership in the per-movie toggle set, released when dropped
struct InFlightMovie<'a> {
    set: &'a Mutex<HashSet<i64>>,
    movie_id: i64,
}

impl<'a> InFlightMovie<'a> {
    fn acquire(set: &'a Mutex<HashSet<i64>>, movie_id: i64) -> Option<Self> {
        let inserted = lock(set).insert(movie_id);
        inserted.then(|| Self { set, movie_id })
    }
}

impl Drop for InFlightMovie<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.movie_id);
    }
}

enum HomePart {
    Section(SectionKind, Vec<Movie>),
    Genres(Vec<Genre>),
}

/// Shared handle to the view state and the operations that change it
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    pub fn builder(
        provider: Arc<dyn MovieProvider>,
        backend: StoreBackend,
        recommender: Arc<dyn Recommender>,
    ) -> CoordinatorBuilder {
        CoordinatorBuilder {
            provider,
            backend,
            recommender,
            settings: CoordinatorSettings::default(),
            on_auth_required: None,
        }
    }

    /// Wires the real TMDB provider, the configured store backend and the
    /// recommendation client
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let provider = Arc::new(TmdbProvider::new(config)?);
        let backend = build_backend(config)?;
        let recommender = Arc::new(RecommendationClient::new(config)?);

        let coordinator = Self::builder(provider, backend, recommender)
            .settings(CoordinatorSettings::from(config))
            .build();

        if config.api_key().is_none() {
            tracing::error!("TMDB API key missing; movie data cannot be loaded");
            coordinator.dispatch(Event::FatalError(MISSING_API_KEY_MESSAGE.to_string()));
        }

        Ok(coordinator)
    }

    pub fn state(&self) -> ViewState {
        self.inner.container.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.inner.container.subscribe()
    }

    pub fn settings(&self) -> CoordinatorSettings {
        self.inner.settings
    }

    fn dispatch(&self, event: Event) -> bool {
        self.inner.container.dispatch(event)
    }

    fn read<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        self.inner.container.read(f)
    }

    fn spawn_tracked<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.inner.container.is_disposed() {
            return;
        }
        let handle = tokio::spawn(task);
        let mut tasks = lock(&self.inner.tasks);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle.abort_handle());
    }

    /// A bad key cannot be fixed by retrying, so it replaces the home view
    fn report_fatal(&self, error: &AppError) {
        if error.is_fatal() {
            tracing::error!(error = %error, "Fatal configuration error");
            self.dispatch(Event::FatalError(error.user_message()));
        }
    }

    /// Loads the session, the home rows and the first discover page together
    pub async fn initialize(&self) {
        let (filters, term) = self.read(|s| (s.filters.clone(), s.debounced_term.clone()));
        tokio::join!(
            self.refresh_session(),
            self.load_home_sections(&SectionKind::ALL),
            self.run_discover(filters, &term),
        );
    }

    // ------------------------------------------------------------------------
    // Search and discover
    // ------------------------------------------------------------------------

    /// Echoes the raw term and schedules the debounced query update
    pub fn set_search_term(&self, text: impl Into<String>) {
        if self.inner.container.is_disposed() {
            return;
        }
        let text = text.into();
        self.dispatch(Event::SearchTermChanged(text.clone()));

        let this = self.clone();
        self.inner.debouncer.schedule(async move {
            this.commit_search_term(text);
        });
    }

    fn commit_search_term(&self, text: String) {
        let term = text.trim().to_string();
        let (unchanged, filters) =
            self.read(|s| (s.debounced_term == term, s.filters.clone()));
        if unchanged {
            tracing::debug!(query = %term, "Debounced term unchanged; skipping fetch");
            return;
        }

        self.dispatch(Event::DebouncedTermCommitted(term.clone()));
        let this = self.clone();
        self.spawn_tracked(async move {
            this.run_discover(filters, &term).await;
        });
    }

    /// Replaces the filters and reruns discover at once; unchanged filters are a no-op
    pub async fn set_filters(&self, filters: DiscoverFilters) -> FetchOutcome {
        let filters = match filters.normalized() {
            Ok(filters) => filters,
            Err(e) => {
                self.dispatch(Event::ErrorRaised(e.user_message()));
                return FetchOutcome::Skipped;
            }
        };

        let (unchanged, term) = self.read(|s| (s.filters == filters, s.debounced_term.clone()));
        if unchanged {
            return FetchOutcome::Skipped;
        }

        self.dispatch(Event::FiltersChanged(filters.clone()));
        self.run_discover(filters, &term).await
    }

    /// Fetches page 1 for `(term, filters)` and makes it the active result set
    pub async fn run_discover(&self, filters: DiscoverFilters, term: &str) -> FetchOutcome {
        let query = DiscoverQuery::new(term, filters);
        self.dispatch(Event::DiscoverStarted {
            query: query.clone(),
        });

        match fetch_query_page(self.inner.provider.as_ref(), &query, 1).await {
            Ok(page) => {
                let results = page.results.len();
                if self.dispatch(Event::DiscoverLoaded {
                    query: query.clone(),
                    movies: page.results,
                }) {
                    tracing::info!(query = %query.term, results, "Discover results committed");
                    FetchOutcome::Committed
                } else {
                    tracing::debug!(query = %query.term, "Discarding stale discover response");
                    FetchOutcome::Discarded
                }
            }
            Err(e) => {
                self.report_fatal(&e);
                if self.dispatch(Event::DiscoverFailed {
                    query: query.clone(),
                    message: DISCOVER_FAILED_MESSAGE.to_string(),
                }) {
                    tracing::warn!(query = %query.term, error = %e, "Discover fetch failed");
                    FetchOutcome::Failed
                } else {
                    tracing::debug!(query = %query.term, "Discarding stale discover failure");
                    FetchOutcome::Discarded
                }
            }
        }
    }

    /// Appends the next page of the active query
    pub async fn load_more(&self) -> FetchOutcome {
        let (query, next_page, allowed) = self.read(|s| {
            (
                s.active_query.clone(),
                s.page + 1,
                s.has_more() && s.discover_status != FetchStatus::Loading,
            )
        });
        if !allowed {
            return FetchOutcome::Skipped;
        }
        let Some(_in_flight) = InFlightFlag::acquire(&self.inner.load_more_in_flight) else {
            tracing::debug!("Load more already running");
            return FetchOutcome::Skipped;
        };

        if !self.dispatch(Event::LoadMoreStarted {
            query: query.clone(),
        }) {
            return FetchOutcome::Discarded;
        }

        let result = fetch_query_page(self.inner.provider.as_ref(), &query, next_page).await;
        let (event, outcome) = match result {
            Ok(page) => {
                let results = page.results.len();
                tracing::info!(query = %query.term, page = next_page, results, "Next page fetched");
                (
                    Event::LoadMoreLoaded {
                        query: query.clone(),
                        page: next_page,
                        movies: page.results,
                    },
                    FetchOutcome::Committed,
                )
            }
            Err(e) => {
                tracing::warn!(query = %query.term, page = next_page, error = %e, "Next page fetch failed");
                (
                    Event::LoadMoreFailed {
                        query: query.clone(),
                        message: DISCOVER_FAILED_MESSAGE.to_string(),
                    },
                    FetchOutcome::Failed,
                )
            }
        };

        if self.dispatch(event) {
            outcome
        } else {
            tracing::debug!(query = %query.term, "Discarding page for superseded query");
            self.dispatch(Event::LoadMoreCancelled);
            FetchOutcome::Discarded
        }
    }

    // ------------------------------------------------------------------------
    // Home
    // ------------------------------------------------------------------------

    /// Fetches the given rows and the genre list concurrently, committing all or nothing
    pub async fn load_home_sections(&self, sections: &[SectionKind]) -> FetchOutcome {
        let generation = self.inner.home_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatch(Event::HomeStarted { generation });

        let mut tasks = JoinSet::new();
        for &kind in sections {
            let provider = self.inner.provider.clone();
            tasks.spawn(async move {
                provider
                    .section(kind)
                    .await
                    .map(|movies| HomePart::Section(kind, movies))
                    .map_err(|e| (Some(kind), e))
            });
        }
        let provider = self.inner.provider.clone();
        tasks.spawn(async move {
            provider
                .genres()
                .await
                .map(HomePart::Genres)
                .map_err(|e| (None, e))
        });

        let mut home = HomeSections::default();
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(HomePart::Section(kind, movies))) => {
                    home.sections.insert(kind, movies);
                }
                Ok(Ok(HomePart::Genres(genres))) => home.genres = genres,
                Ok(Err(failed)) => {
                    failure = Some(failed);
                    break;
                }
                Err(e) => {
                    failure = Some((None, AppError::Internal(e.to_string())));
                    break;
                }
            }
        }

        if let Some((section, e)) = failure {
            tasks.abort_all();
            tracing::warn!(section = ?section, error = %e, "Home load failed");
            self.report_fatal(&e);
            return if self.dispatch(Event::HomeFailed {
                generation,
                message: HOME_FAILED_MESSAGE.to_string(),
            }) {
                FetchOutcome::Failed
            } else {
                FetchOutcome::Discarded
            };
        }

        let trending = home.section(SectionKind::Trending).len();
        if self.dispatch(Event::HomeLoaded { generation, home }) {
            tracing::info!(generation, sections = sections.len(), trending, "Home sections committed");
            self.restart_rotation(generation);
            FetchOutcome::Committed
        } else {
            tracing::debug!(generation, "Discarding superseded home load");
            FetchOutcome::Discarded
        }
    }

    fn restart_rotation(&self, generation: u64) {
        let mut rotation = lock(&self.inner.rotation);
        let (current, empty) = self.read(|s| (s.pool_generation, s.trending_pool().is_empty()));
        // A newer pool already owns the ticker
        if current != generation {
            return;
        }
        if let Some(previous) = rotation.take() {
            previous.abort();
        }
        if empty || self.inner.container.is_disposed() {
            return;
        }
        *rotation = Some(rotation::spawn_rotation(
            Arc::downgrade(&self.inner.container),
            generation,
            self.inner.settings.featured_rotation,
        ));
    }

    // ------------------------------------------------------------------------
    // Watchlist
    // ------------------------------------------------------------------------

    /// Adds or removes `movie` for the signed-in user, updating the list optimistically
    pub async fn toggle_watchlist(&self, movie: &Movie) -> ToggleOutcome {
        let mutation_id = Uuid::new_v4();
        let span = tracing::info_span!("toggle_watchlist", %mutation_id, movie_id = movie.id);
        self.toggle(movie).instrument(span).await
    }

    async fn toggle(&self, movie: &Movie) -> ToggleOutcome {
        let Some(owner) = self.read(|s| s.session.user_id.clone()) else {
            tracing::debug!("Guest tried to change the watchlist");
            self.dispatch(Event::AuthPromptRequested);
            if let Some(hook) = &self.inner.on_auth_required {
                hook();
            }
            return ToggleOutcome::AuthRequired;
        };

        let Some(_in_flight) = InFlightMovie::acquire(&self.inner.toggles_in_flight, movie.id)
        else {
            tracing::debug!("Toggle already in flight");
            return ToggleOutcome::Busy;
        };

        match self.read(|s| s.watchlist_entry(movie.id).cloned()) {
            Some(entry) => self.remove_entry(&owner, entry).await,
            None => self.add_movie(&owner, movie).await,
        }
    }

    async fn add_movie(&self, owner: &str, movie: &Movie) -> ToggleOutcome {
        let saved = WatchlistMovie::from(movie);
        let mutation = OptimisticMutation::new(
            Event::WatchlistInserted(WatchlistEntry::pending(owner, saved.clone())),
            Event::WatchlistRemoved {
                owner_id: owner.to_string(),
                movie_id: movie.id,
            },
        );

        let result = mutation
            .run(&self.inner.container, async {
                self.ensure_access(owner).await?;
                self.inner.store.create(owner, &saved).await
            })
            .await;

        match result {
            Ok(entry) => {
                self.dispatch(Event::WatchlistConfirmed(entry));
                tracing::info!(store = self.inner.store.name(), "Added to watchlist");
                ToggleOutcome::Added
            }
            Err(_) => ToggleOutcome::Failed,
        }
    }

    async fn remove_entry(&self, owner: &str, entry: WatchlistEntry) -> ToggleOutcome {
        let movie_id = entry.movie.id;
        let mutation = OptimisticMutation::new(
            Event::WatchlistRemoved {
                owner_id: owner.to_string(),
                movie_id,
            },
            Event::WatchlistInserted(entry.clone()),
        );
        let store = &self.inner.store;

        let result = mutation
            .run(&self.inner.container, async {
                let document_id = match entry.remote_document_id.clone() {
                    Some(id) => id,
                    None => match store
                        .find_one(owner, movie_id)
                        .await?
                        .and_then(|found| found.remote_document_id)
                    {
                        Some(id) => id,
                        None => return Ok(()),
                    },
                };

                match store.delete(&document_id).await {
                    Err(AppError::NotFound(_)) => {
                        tracing::debug!(document_id = %document_id, "Document already gone");
                        Ok(())
                    }
                    other => other,
                }
            })
            .await;

        match result {
            Ok(()) => {
                tracing::info!(store = store.name(), "Removed from watchlist");
                ToggleOutcome::Removed
            }
            Err(_) => ToggleOutcome::Failed,
        }
    }

    /// Runs the store's permission check once per signed-in owner
    async fn ensure_access(&self, owner: &str) -> AppResult<()> {
        let verified = lock(&self.inner.verified_owner).as_deref() == Some(owner);
        if verified {
            return Ok(());
        }

        self.inner.store.verify_access(owner).await?;
        *lock(&self.inner.verified_owner) = Some(owner.to_string());
        tracing::debug!(owner_id = %owner, "Watchlist store access verified");
        Ok(())
    }

    /// Loads the signed-in user's watchlist
    pub async fn load_watchlist(&self) -> FetchOutcome {
        let Some(owner) = self.read(|s| s.session.user_id.clone()) else {
            return FetchOutcome::Skipped;
        };
        self.dispatch(Event::WatchlistLoading {
            owner_id: owner.clone(),
        });

        let event = match self.inner.store.find_by_owner(&owner).await {
            Ok(entries) => {
                tracing::info!(owner_id = %owner, entries = entries.len(), "Watchlist fetched");
                Event::WatchlistLoaded {
                    owner_id: owner,
                    entries,
                }
            }
            Err(AppError::StoreUnavailable) => {
                tracing::warn!(store = self.inner.store.name(), "Watchlist store unavailable; showing an empty list");
                Event::WatchlistLoaded {
                    owner_id: owner,
                    entries: Vec::new(),
                }
            }
            Err(e) => {
                tracing::warn!(owner_id = %owner, error = %e, "Watchlist fetch failed");
                Event::WatchlistFailed {
                    owner_id: owner,
                    message: e.user_message(),
                }
            }
        };

        let failed = matches!(event, Event::WatchlistFailed { .. });
        match (self.dispatch(event), failed) {
            (true, false) => FetchOutcome::Committed,
            (true, true) => FetchOutcome::Failed,
            (false, _) => FetchOutcome::Discarded,
        }
    }

    // ------------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------------

    /// Reads the current session; a signed-in user gets their watchlist loaded
    pub async fn refresh_session(&self) -> Session {
        let session = self.inner.auth.current_session().await.unwrap_or_default();
        self.apply_session(session.clone()).await;
        session
    }

    async fn apply_session(&self, session: Session) {
        let owner_changed = self.read(|s| s.session.user_id != session.user_id);
        if owner_changed {
            *lock(&self.inner.verified_owner) = None;
        }

        let signed_in = !session.is_guest();
        self.dispatch(Event::SessionChanged(session));
        if signed_in {
            self.load_watchlist().await;
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        match self.inner.auth.login(email, password).await {
            Ok(session) => {
                tracing::info!(user_id = ?session.user_id, "Signed in");
                self.apply_session(session).await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                self.dispatch(Event::ErrorRaised(e.user_message()));
                false
            }
        }
    }

    pub async fn signup(&self, email: &str, password: &str, name: &str) -> bool {
        match self.inner.auth.signup(email, password, name).await {
            Ok(session) => {
                tracing::info!(user_id = ?session.user_id, "Account created");
                self.apply_session(session).await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Signup failed");
                self.dispatch(Event::ErrorRaised(e.user_message()));
                false
            }
        }
    }

    /// Ends the session; local state is cleared even if the remote call fails
    pub async fn logout(&self) {
        if let Err(e) = self.inner.auth.logout().await {
            tracing::warn!(error = %e, "Remote logout failed; clearing local session anyway");
        }
        *lock(&self.inner.verified_owner) = None;
        self.dispatch(Event::SessionChanged(Session::guest()));
    }

    // ------------------------------------------------------------------------
    // Details, trailers, recommendations
    // ------------------------------------------------------------------------

    pub async fn open_details(&self, movie_id: i64) -> FetchOutcome {
        self.dispatch(Event::DetailsRequested { movie_id });

        let provider = self.inner.provider.as_ref();
        let result = tokio::try_join!(
            provider.movie_detail(movie_id),
            provider.credits(movie_id),
            provider.images(movie_id),
            provider.videos(movie_id),
            provider.similar(movie_id),
        );

        match result {
            Ok((movie, cast, images, videos, similar)) => {
                let details = MovieDetails {
                    movie,
                    cast,
                    images,
                    videos,
                    similar,
                };
                if self.dispatch(Event::DetailsLoaded(details)) {
                    FetchOutcome::Committed
                } else {
                    tracing::debug!(movie_id, "Details arrived after selection changed");
                    FetchOutcome::Discarded
                }
            }
            Err(e) => {
                tracing::warn!(movie_id, error = %e, "Details fetch failed");
                if self.dispatch(Event::DetailsFailed {
                    movie_id,
                    message: e.user_message(),
                }) {
                    FetchOutcome::Failed
                } else {
                    FetchOutcome::Discarded
                }
            }
        }
    }

    pub fn close_details(&self) {
        self.dispatch(Event::DetailsClosed);
    }

    pub async fn open_trailer(&self, movie_id: i64) -> FetchOutcome {
        self.dispatch(Event::TrailerRequested { movie_id });

        let trailer = match self.inner.provider.videos(movie_id).await {
            Ok(videos) => resolve_trailer(&videos).map(|video| Trailer {
                movie_id,
                url: youtube_url(video),
            }),
            Err(e) => {
                tracing::warn!(movie_id, error = %e, "Video lookup failed");
                None
            }
        };

        let (event, outcome) = match trailer {
            Some(trailer) => (Event::TrailerResolved(trailer), FetchOutcome::Committed),
            None => (
                Event::TrailerUnavailable {
                    movie_id,
                    message: TRAILER_UNAVAILABLE_MESSAGE.to_string(),
                },
                FetchOutcome::Failed,
            ),
        };

        if self.dispatch(event) {
            outcome
        } else {
            FetchOutcome::Discarded
        }
    }

    pub fn close_trailer(&self) {
        self.dispatch(Event::TrailerClosed);
    }

    pub async fn request_recommendations(&self, title: &str) -> FetchOutcome {
        let title = title.trim().to_string();
        if title.is_empty() {
            self.dispatch(Event::RecommendationsFailed {
                title: None,
                message: BLANK_TITLE_MESSAGE.to_string(),
            });
            return FetchOutcome::Skipped;
        }

        self.dispatch(Event::RecommendationsStarted {
            title: title.clone(),
        });
        let request = RecommendationRequest {
            movie_title: title.clone(),
            num_recommendations: DEFAULT_RECOMMENDATION_COUNT,
            uid: self.read(|s| s.session.user_id.clone()),
        };

        let (event, outcome) = match self.inner.recommender.recommend(request).await {
            Ok(response) => {
                tracing::info!(title = %title, results = response.recommendations.len(), "Recommendations received");
                (
                    Event::RecommendationsLoaded {
                        title,
                        response,
                    },
                    FetchOutcome::Committed,
                )
            }
            Err(e) => {
                tracing::warn!(title = %title, error = %e, "Recommendation request failed");
                (
                    Event::RecommendationsFailed {
                        title: Some(title),
                        message: e.user_message(),
                    },
                    FetchOutcome::Failed,
                )
            }
        };

        if self.dispatch(event) {
            outcome
        } else {
            FetchOutcome::Discarded
        }
    }

    // ------------------------------------------------------------------------
    // Dismissals and teardown
    // ------------------------------------------------------------------------

    pub fn dismiss_error(&self) {
        self.dispatch(Event::ErrorDismissed);
    }

    pub fn dismiss_auth_prompt(&self) {
        self.dispatch(Event::AuthPromptDismissed);
    }

    /// Stops timers and in-flight work; later results are never committed
    pub fn shutdown(&self) {
        self.inner.container.dispose();
        self.inner.debouncer.cancel();
        if let Some(handle) = lock(&self.inner.rotation).take() {
            handle.abort();
        }
        for task in lock(&self.inner.tasks).drain(..) {
            task.abort();
        }
        tracing::info!("Coordinator shut down");
    }
}
