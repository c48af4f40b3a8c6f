/// Appwrite backend
///
/// Talks to the Appwrite REST API directly. One client serves both roles: the account
/// endpoints back [`AuthProvider`] and the database endpoints back [`WatchlistStore`].
/// The session lives in the client's cookie jar, exactly like the browser SDK.
///
/// API Flow:
/// 1. Session: POST /account/sessions/email → cookie; GET /account → current user
/// 2. Watchlist: GET|POST /databases/{db}/collections/{col}/documents, DELETE …/{id}
use crate::{
    config::AppwriteSettings,
    error::{AppError, AppResult},
    models::{Session, WatchlistEntry, WatchlistMovie},
    store::{AuthProvider, WatchlistStore},
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const LIST_LIMIT: u32 = 100;

/// What a request was doing, used to pick the error for 401/403 responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Account,
    Read,
    Write,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    #[serde(rename = "$id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl From<AccountResponse> for Session {
    fn from(account: AccountResponse) -> Self {
        let display_name = account
            .name
            .filter(|name| !name.trim().is_empty())
            .or(account.email);
        Session::user(account.id, display_name)
    }
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<WatchlistDocument>,
}

/// A document in the watchlist collection
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct WatchlistDocument {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "movieId")]
    movie_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    overview: Option<String>,
}

impl WatchlistDocument {
    /// Converts to an entry; documents with a non-numeric movie id are skipped
    fn into_entry(self) -> Option<WatchlistEntry> {
        let movie_id = match self.movie_id.trim().parse::<i64>() {
            Ok(id) => id,
            Err(_) => {
                tracing::warn!(
                    document_id = %self.id,
                    movie_id = %self.movie_id,
                    "Skipping watchlist document with invalid movie id"
                );
                return None;
            }
        };

        Some(WatchlistEntry {
            owner_id: self.user_id,
            remote_document_id: Some(self.id),
            movie: WatchlistMovie {
                id: movie_id,
                title: self.title,
                poster_path: self.poster_path.filter(|p| !p.is_empty()),
                backdrop_path: self.backdrop_path.filter(|p| !p.is_empty()),
                vote_average: self.vote_average,
                overview: self.overview,
            },
        })
    }
}

fn query_equal(attribute: &str, value: &str) -> String {
    json!({"method": "equal", "attribute": attribute, "values": [value]}).to_string()
}

fn query_order_desc(attribute: &str) -> String {
    json!({"method": "orderDesc", "attribute": attribute}).to_string()
}

fn query_limit(limit: u32) -> String {
    json!({"method": "limit", "values": [limit]}).to_string()
}

/// Document-level permissions granting only the owner access
fn owner_permissions(owner_id: &str) -> Vec<String> {
    ["read", "update", "delete"]
        .iter()
        .map(|action| format!("{}(\"user:{}\")", action, owner_id))
        .collect()
}

#[derive(Clone)]
pub struct AppwriteClient {
    http_client: HttpClient,
    settings: AppwriteSettings,
}

impl AppwriteClient {
    pub fn new(settings: AppwriteSettings, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.endpoint, path)
    }

    fn documents_url(&self) -> AppResult<String> {
        match (&self.settings.database_id, &self.settings.collection_id) {
            (Some(database_id), Some(collection_id)) => Ok(self.url(&format!(
                "/databases/{}/collections/{}/documents",
                database_id, collection_id
            ))),
            _ => Err(AppError::StoreUnavailable),
        }
    }

    /// Maps a non-success response to the matching error kind
    async fn check(response: Response, operation: Operation) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["message"].as_str().map(str::to_string))
            .unwrap_or(body);

        tracing::warn!(status = %status, operation = ?operation, message = %message, "Appwrite request failed");

        Err(match (status, operation) {
            (StatusCode::NOT_FOUND, Operation::Read | Operation::Write) => {
                AppError::NotFound(message)
            }
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, Operation::Read) => {
                AppError::Config(format!(
                    "The watchlist collection cannot be read with this account. Check the collection permissions. ({})",
                    message
                ))
            }
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, Operation::Write) => {
                AppError::Config(format!(
                    "The watchlist collection does not allow this account to create documents. Grant the users role create access. ({})",
                    message
                ))
            }
            (StatusCode::UNAUTHORIZED, Operation::Account) => AppError::AuthRequired,
            _ => AppError::upstream(status, message),
        })
    }

    async fn current_account(&self) -> AppResult<AccountResponse> {
        let response = self
            .http_client
            .get(self.url("/account"))
            .header(PROJECT_HEADER, &self.settings.project_id)
            .send()
            .await?;
        let response = Self::check(response, Operation::Account).await?;
        Ok(response.json().await?)
    }

    async fn list(&self, queries: Vec<String>, operation: Operation) -> AppResult<Vec<WatchlistEntry>> {
        let url = self.documents_url()?;
        let params: Vec<(&str, String)> = queries.into_iter().map(|q| ("queries[]", q)).collect();

        let response = self
            .http_client
            .get(&url)
            .header(PROJECT_HEADER, &self.settings.project_id)
            .query(&params)
            .send()
            .await?;
        let response = Self::check(response, operation).await?;
        let list: DocumentList = response.json().await?;

        Ok(list
            .documents
            .into_iter()
            .filter_map(WatchlistDocument::into_entry)
            .collect())
    }
}

#[async_trait::async_trait]
impl WatchlistStore for AppwriteClient {
    async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<WatchlistEntry>> {
        let entries = self
            .list(
                vec![
                    query_equal("userId", owner_id),
                    query_order_desc("$createdAt"),
                    query_limit(LIST_LIMIT),
                ],
                Operation::Read,
            )
            .await?;

        tracing::info!(owner_id = %owner_id, entries = entries.len(), "Watchlist loaded from Appwrite");
        Ok(entries)
    }

    async fn find_one(&self, owner_id: &str, movie_id: i64) -> AppResult<Option<WatchlistEntry>> {
        let entries = self
            .list(
                vec![
                    query_equal("userId", owner_id),
                    query_equal("movieId", &movie_id.to_string()),
                    query_limit(1),
                ],
                Operation::Read,
            )
            .await?;
        Ok(entries.into_iter().next())
    }

    async fn create(&self, owner_id: &str, movie: &WatchlistMovie) -> AppResult<WatchlistEntry> {
        if let Some(existing) = self.find_one(owner_id, movie.id).await? {
            tracing::debug!(movie_id = movie.id, "Watchlist document already exists");
            return Ok(existing);
        }

        let url = self.documents_url()?;
        let body = json!({
            "documentId": "unique()",
            "data": {
                "userId": owner_id,
                "movieId": movie.id.to_string(),
                "title": movie.title,
                "poster_path": movie.poster_path.clone().unwrap_or_default(),
            },
            "permissions": owner_permissions(owner_id),
        });

        let response = self
            .http_client
            .post(&url)
            .header(PROJECT_HEADER, &self.settings.project_id)
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response, Operation::Write).await?;
        let document: WatchlistDocument = response.json().await?;

        tracing::info!(
            owner_id = %owner_id,
            movie_id = movie.id,
            document_id = %document.id,
            "Watchlist document created"
        );

        document.into_entry().ok_or_else(|| {
            AppError::upstream(
                StatusCode::OK,
                "Appwrite returned a document with an invalid movie id",
            )
        })
    }

    async fn delete(&self, document_id: &str) -> AppResult<()> {
        let url = format!("{}/{}", self.documents_url()?, document_id);

        let response = self
            .http_client
            .delete(&url)
            .header(PROJECT_HEADER, &self.settings.project_id)
            .send()
            .await?;
        Self::check(response, Operation::Write).await?;

        tracing::info!(document_id = %document_id, "Watchlist document deleted");
        Ok(())
    }

    async fn verify_access(&self, owner_id: &str) -> AppResult<()> {
        // 1. The cookie session must belong to the owner
        let account = self.current_account().await?;
        if account.id != owner_id {
            return Err(AppError::AuthRequired);
        }

        // 2. The collection must exist and be readable
        self.list(
            vec![query_equal("userId", owner_id), query_limit(1)],
            Operation::Read,
        )
        .await
        .map_err(|e| match e {
            AppError::NotFound(msg) => AppError::Config(format!(
                "The watchlist database or collection was not found. Check APPWRITE_DATABASE_ID and APPWRITE_WATCHLIST_COLLECTION_ID. ({})",
                msg
            )),
            other => other,
        })?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "appwrite"
    }
}

#[async_trait::async_trait]
impl AuthProvider for AppwriteClient {
    async fn current_session(&self) -> Option<Session> {
        match self.current_account().await {
            Ok(account) => Some(account.into()),
            Err(e) => {
                tracing::debug!(error = %e, "No active Appwrite session");
                None
            }
        }
    }

    async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let response = self
            .http_client
            .post(self.url("/account/sessions/email"))
            .header(PROJECT_HEADER, &self.settings.project_id)
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        // A 401 here means bad credentials rather than a missing session
        Self::check(response, Operation::Account)
            .await
            .map_err(|e| match e {
                AppError::AuthRequired => AppError::upstream(
                    StatusCode::UNAUTHORIZED,
                    "Invalid credentials. Please check the email and password.",
                ),
                other => other,
            })?;

        let session: Session = self.current_account().await?.into();
        tracing::info!(user_id = ?session.user_id, "Signed in");
        Ok(session)
    }

    async fn signup(&self, email: &str, password: &str, name: &str) -> AppResult<Session> {
        let response = self
            .http_client
            .post(self.url("/account"))
            .header(PROJECT_HEADER, &self.settings.project_id)
            .json(&json!({
                "userId": "unique()",
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await?;
        Self::check(response, Operation::Account).await?;

        self.login(email, password).await
    }

    async fn logout(&self) -> AppResult<()> {
        let response = self
            .http_client
            .delete(self.url("/account/sessions/current"))
            .header(PROJECT_HEADER, &self.settings.project_id)
            .send()
            .await?;

        // Logging out without a session is not an error
        match Self::check(response, Operation::Account).await {
            Ok(_) | Err(AppError::AuthRequired) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
