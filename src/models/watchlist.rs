use serde::{Deserialize, Serialize};

use super::WatchlistMovie;

/// One saved movie for one owner
///
/// At most one entry exists per `(owner_id, movie.id)`. `remote_document_id` is `None`
/// while an optimistic add is still waiting for the store to confirm it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    pub owner_id: String,
    pub movie: WatchlistMovie,
    pub remote_document_id: Option<String>,
}

impl WatchlistEntry {
    pub fn pending(owner_id: impl Into<String>, movie: WatchlistMovie) -> Self {
        Self {
            owner_id: owner_id.into(),
            movie,
            remote_document_id: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.remote_document_id.is_none()
    }

    pub fn movie_id(&self) -> i64 {
        self.movie.id
    }
}

/// The signed-in user, or a guest when `user_id` is absent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Session {
    pub user_id: Option<String>,
    pub display_name: Option<String>,
}

impl Session {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            display_name,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}
