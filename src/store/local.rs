use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::{Session, WatchlistEntry, WatchlistMovie},
    store::{AuthProvider, KeyValueStore, WatchlistStore},
};

/// Storage key holding the serialized watchlist
pub const WATCHLIST_KEY: &str = "cinevibe:watchlist";

/// Owner id of the single local profile
pub const LOCAL_OWNER_ID: &str = "local";

/// Minimal movie record kept in local storage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct LocalRecord {
    id: i64,
    title: String,
    #[serde(default)]
    poster_path: Option<String>,
}

impl LocalRecord {
    fn into_entry(self) -> WatchlistEntry {
        WatchlistEntry {
            owner_id: LOCAL_OWNER_ID.to_string(),
            remote_document_id: Some(self.id.to_string()),
            movie: WatchlistMovie {
                id: self.id,
                title: self.title,
                poster_path: self.poster_path,
                backdrop_path: None,
                vote_average: None,
                overview: None,
            },
        }
    }
}

/// Watchlist kept under one key as a JSON array of `{id, title, poster_path}`.
///
/// There is a single local profile, so entries for any other owner never exist. The
/// movie id doubles as the document id.
pub struct LocalWatchlistStore<B> {
    backend: B,
    // Serializes read-modify-write cycles on the key
    write_lock: Mutex<()>,
}

impl<B: KeyValueStore> LocalWatchlistStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> AppResult<Vec<LocalRecord>> {
        match self.backend.get(WATCHLIST_KEY).await? {
            Some(json) => match serde_json::from_str(&json) {
                Ok(records) => Ok(records),
                Err(e) => {
                    // A corrupt value would otherwise block the feature forever
                    tracing::warn!(error = %e, "Discarding unreadable local watchlist");
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, records: &[LocalRecord]) -> AppResult<()> {
        let json = serde_json::to_string(records)?;
        self.backend.set(WATCHLIST_KEY, json).await
    }
}

#[async_trait::async_trait]
impl<B: KeyValueStore> WatchlistStore for LocalWatchlistStore<B> {
    async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<WatchlistEntry>> {
        if owner_id != LOCAL_OWNER_ID {
            return Ok(Vec::new());
        }
        let records = self.load().await?;
        // Newest additions are appended, so reverse for newest first
        Ok(records.into_iter().rev().map(LocalRecord::into_entry).collect())
    }

    async fn find_one(&self, owner_id: &str, movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        if owner_id != LOCAL_OWNER_ID {
            return Ok(None);
        }
        let records = self.load().await?;
        Ok(records
            .into_iter()
            .find(|record| record.id == movie_id)
            .map(LocalRecord::into_entry))
    }

    async fn create(&self, owner_id: &str, movie: &WatchlistMovie) -> AppResult<WatchlistEntry> {
        if owner_id != LOCAL_OWNER_ID {
            return Err(AppError::AuthRequired);
        }

        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;

        if let Some(existing) = records.iter().find(|record| record.id == movie.id) {
            tracing::debug!(movie_id = movie.id, "Movie already in local watchlist");
            return Ok(existing.clone().into_entry());
        }

        let record = LocalRecord {
            id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
        };
        records.push(record.clone());
        self.save(&records).await?;

        Ok(record.into_entry())
    }

    async fn delete(&self, document_id: &str) -> AppResult<()> {
        let movie_id: i64 = document_id
            .parse()
            .map_err(|_| AppError::NotFound(format!("watchlist document {}", document_id)))?;

        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|record| record.id != movie_id);

        if records.len() == before {
            return Err(AppError::NotFound(format!(
                "watchlist document {}",
                document_id
            )));
        }

        self.save(&records).await
    }

    async fn verify_access(&self, owner_id: &str) -> AppResult<()> {
        if owner_id != LOCAL_OWNER_ID {
            return Err(AppError::AuthRequired);
        }
        // Reading proves the backend is reachable
        self.backend.get(WATCHLIST_KEY).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// Auth provider for the local profile; the session always exists
#[derive(Debug, Clone, Default)]
pub struct LocalAuth;

impl LocalAuth {
    fn session() -> Session {
        Session::user(LOCAL_OWNER_ID, Some("Local profile".to_string()))
    }
}

#[async_trait::async_trait]
impl AuthProvider for LocalAuth {
    async fn current_session(&self) -> Option<Session> {
        Some(Self::session())
    }

    async fn login(&self, _email: &str, _password: &str) -> AppResult<Session> {
        Ok(Self::session())
    }

    async fn signup(&self, _email: &str, _password: &str, _name: &str) -> AppResult<Session> {
        Ok(Self::session())
    }

    async fn logout(&self) -> AppResult<()> {
        Ok(())
    }
}
