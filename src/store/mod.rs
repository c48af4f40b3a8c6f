//! Watchlist persistence and authentication backends.
//!
//! The coordinator sees two traits: [`WatchlistStore`] for documents keyed by
//! `(owner, movie)` and [`AuthProvider`] for sessions. Which implementation sits behind
//! them is decided once, from configuration, by [`build_backend`].

use std::sync::Arc;

use crate::{
    config::{Config, WatchlistBackend},
    error::{AppError, AppResult},
    models::{Session, WatchlistEntry, WatchlistMovie},
};

pub mod appwrite;
pub mod kv;
pub mod local;

pub use appwrite::AppwriteClient;
pub use kv::{KeyValueStore, MemoryKeyValue, RedisKeyValue};
pub use local::{LocalAuth, LocalWatchlistStore};

/// Document store holding watchlist entries
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    /// All entries for an owner, newest first.
    ///
    /// Fails with `StoreUnavailable` when the store is not configured; callers treat
    /// that as an empty list.
    async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<WatchlistEntry>>;

    async fn find_one(&self, owner_id: &str, movie_id: i64) -> AppResult<Option<WatchlistEntry>>;

    /// Idempotent create: an existing `(owner, movie)` document is returned unchanged
    async fn create(&self, owner_id: &str, movie: &WatchlistMovie) -> AppResult<WatchlistEntry>;

    /// Fails with `NotFound` if the document is already gone
    async fn delete(&self, document_id: &str) -> AppResult<()>;

    /// Permission bootstrap run before the first write.
    ///
    /// Misconfiguration (missing collection, no read/write permission) is reported as
    /// `AppError::Config` so it is not mistaken for a transient network failure.
    async fn verify_access(&self, owner_id: &str) -> AppResult<()>;

    fn name(&self) -> &'static str;
}

/// Session provider
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Fails closed: any transport or auth error yields `None`
    async fn current_session(&self) -> Option<Session>;

    async fn login(&self, email: &str, password: &str) -> AppResult<Session>;

    async fn signup(&self, email: &str, password: &str, name: &str) -> AppResult<Session>;

    async fn logout(&self) -> AppResult<()>;
}

/// Store used when no backend is configured
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredStore;

#[async_trait::async_trait]
impl WatchlistStore for UnconfiguredStore {
    async fn find_by_owner(&self, _owner_id: &str) -> AppResult<Vec<WatchlistEntry>> {
        Err(AppError::StoreUnavailable)
    }

    async fn find_one(&self, _owner_id: &str, _movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        Err(AppError::StoreUnavailable)
    }

    async fn create(&self, _owner_id: &str, _movie: &WatchlistMovie) -> AppResult<WatchlistEntry> {
        Err(AppError::StoreUnavailable)
    }

    async fn delete(&self, _document_id: &str) -> AppResult<()> {
        Err(AppError::StoreUnavailable)
    }

    async fn verify_access(&self, _owner_id: &str) -> AppResult<()> {
        Err(AppError::StoreUnavailable)
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}

/// Auth provider used when no backend is configured; everyone is a guest
#[derive(Debug, Clone, Default)]
pub struct GuestAuth;

#[async_trait::async_trait]
impl AuthProvider for GuestAuth {
    async fn current_session(&self) -> Option<Session> {
        None
    }

    async fn login(&self, _email: &str, _password: &str) -> AppResult<Session> {
        Err(AppError::StoreUnavailable)
    }

    async fn signup(&self, _email: &str, _password: &str, _name: &str) -> AppResult<Session> {
        Err(AppError::StoreUnavailable)
    }

    async fn logout(&self) -> AppResult<()> {
        Ok(())
    }
}

/// The watchlist store and auth provider selected by configuration
#[derive(Clone)]
pub struct StoreBackend {
    pub watchlist: Arc<dyn WatchlistStore>,
    pub auth: Arc<dyn AuthProvider>,
}

impl StoreBackend {
    pub fn new(watchlist: Arc<dyn WatchlistStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { watchlist, auth }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(UnconfiguredStore), Arc::new(GuestAuth))
    }
}

/// Builds the backend for the configured watchlist mode
pub fn build_backend(config: &Config) -> AppResult<StoreBackend> {
    match config.watchlist_backend() {
        WatchlistBackend::Appwrite(settings) => {
            if !settings.has_collection() {
                tracing::warn!(
                    "Appwrite database or collection id missing; watchlist sync disabled"
                );
            }
            let client = Arc::new(AppwriteClient::new(settings, config.request_timeout())?);
            tracing::info!(backend = "appwrite", "Watchlist backend configured");
            Ok(StoreBackend::new(client.clone(), client))
        }
        WatchlistBackend::Local { redis_url } => {
            let kv = RedisKeyValue::open(&redis_url)?;
            tracing::info!(backend = "local", "Watchlist backend configured");
            Ok(StoreBackend::new(
                Arc::new(LocalWatchlistStore::new(kv)),
                Arc::new(LocalAuth),
            ))
        }
        WatchlistBackend::Disabled => {
            tracing::info!(backend = "disabled", "No watchlist backend configured");
            Ok(StoreBackend::disabled())
        }
    }
}
