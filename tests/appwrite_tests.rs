mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use cinevibe::{
    config::AppwriteSettings,
    models::WatchlistMovie,
    store::{AppwriteClient, AuthProvider, WatchlistStore},
    AppError,
};

const PROJECT: &str = "cinevibe-test";

#[derive(Default)]
struct Backend {
    signed_in: bool,
    deny_writes: bool,
    next_id: u32,
    documents: Vec<Value>,
    posted: Vec<Value>,
}

#[derive(Clone, Default)]
struct Appwrite(Arc<Mutex<Backend>>);

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"message": message, "code": status.as_u16()}))).into_response()
}

fn has_project(headers: &HeaderMap) -> bool {
    headers
        .get("x-appwrite-project")
        .and_then(|v| v.to_str().ok())
        == Some(PROJECT)
}

async fn account(State(app): State<Appwrite>, headers: HeaderMap) -> Response {
    if !has_project(&headers) {
        return error(StatusCode::BAD_REQUEST, "Project header missing");
    }
    if !app.0.lock().unwrap().signed_in {
        return error(
            StatusCode::UNAUTHORIZED,
            "User (role: guests) missing scope (account)",
        );
    }
    Json(json!({"$id": "u1", "name": "Ada", "email": "ada@example.com"})).into_response()
}

async fn create_account(Json(body): Json<Value>) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({"$id": "u1", "name": body["name"], "email": body["email"]})),
    )
        .into_response()
}

async fn create_session(State(app): State<Appwrite>, Json(body): Json<Value>) -> Response {
    if body["password"] != "hunter22" {
        return error(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials. Please check the email and password.",
        );
    }
    app.0.lock().unwrap().signed_in = true;
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, "a_session_test=abc; Path=/; HttpOnly")],
        Json(json!({"$id": "session-1", "userId": "u1"})),
    )
        .into_response()
}

async fn delete_session(State(app): State<Appwrite>) -> Response {
    let mut backend = app.0.lock().unwrap();
    if !backend.signed_in {
        return error(StatusCode::UNAUTHORIZED, "No session");
    }
    backend.signed_in = false;
    StatusCode::NO_CONTENT.into_response()
}

fn collection_exists(database: &str, collection: &str) -> bool {
    database == "db1" && collection == "watchlist"
}

async fn list_documents(
    State(app): State<Appwrite>,
    Path((database, collection)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    if !collection_exists(&database, &collection) {
        return error(StatusCode::NOT_FOUND, "Collection with the requested ID could not be found.");
    }

    let queries: Vec<Value> = params
        .iter()
        .filter(|(key, _)| key == "queries[]")
        .filter_map(|(_, value)| serde_json::from_str(value).ok())
        .collect();
    let limit = queries
        .iter()
        .find(|q| q["method"] == "limit")
        .and_then(|q| q["values"][0].as_u64())
        .unwrap_or(25) as usize;

    let backend = app.0.lock().unwrap();
    let documents: Vec<Value> = backend
        .documents
        .iter()
        .rev()
        .filter(|doc| {
            queries
                .iter()
                .filter(|q| q["method"] == "equal")
                .all(|q| {
                    let attribute = q["attribute"].as_str().unwrap_or_default();
                    q["values"][0] == doc[attribute]
                })
        })
        .take(limit)
        .cloned()
        .collect();

    Json(json!({"total": documents.len(), "documents": documents})).into_response()
}

async fn create_document(
    State(app): State<Appwrite>,
    Path((database, collection)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if !collection_exists(&database, &collection) {
        return error(StatusCode::NOT_FOUND, "Collection not found");
    }
    let mut backend = app.0.lock().unwrap();
    if backend.deny_writes {
        return error(
            StatusCode::UNAUTHORIZED,
            "The current user is not authorized to perform the requested action.",
        );
    }

    backend.next_id += 1;
    let mut document = body["data"].clone();
    document["$id"] = json!(format!("doc{}", backend.next_id));
    document["$permissions"] = body["permissions"].clone();
    backend.posted.push(body);
    backend.documents.push(document.clone());
    (StatusCode::CREATED, Json(document)).into_response()
}

async fn delete_document(
    State(app): State<Appwrite>,
    Path((_database, _collection, id)): Path<(String, String, String)>,
) -> Response {
    let mut backend = app.0.lock().unwrap();
    let before = backend.documents.len();
    backend.documents.retain(|doc| doc["$id"] != id.as_str());
    if backend.documents.len() == before {
        return error(StatusCode::NOT_FOUND, "Document with the requested ID could not be found.");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn start_appwrite() -> (String, Appwrite) {
    let app = Appwrite::default();
    let router = Router::new()
        .route("/v1/account", get(account).post(create_account))
        .route("/v1/account/sessions/email", post(create_session))
        .route("/v1/account/sessions/current", delete(delete_session))
        .route(
            "/v1/databases/:database/collections/:collection/documents",
            get(list_documents).post(create_document),
        )
        .route(
            "/v1/databases/:database/collections/:collection/documents/:id",
            delete(delete_document),
        )
        .with_state(app.clone());
    let base = common::serve(router).await;
    (format!("{}/v1", base), app)
}

fn client(endpoint: &str, collection: Option<&str>) -> AppwriteClient {
    AppwriteClient::new(
        AppwriteSettings {
            endpoint: endpoint.to_string(),
            project_id: PROJECT.to_string(),
            database_id: Some("db1".to_string()),
            collection_id: collection.map(str::to_string),
        },
        Duration::from_secs(5),
    )
    .unwrap()
}

fn movie(id: i64, title: &str) -> WatchlistMovie {
    WatchlistMovie {
        id,
        title: title.to_string(),
        poster_path: Some("/poster.jpg".to_string()),
        backdrop_path: Some("/backdrop.jpg".to_string()),
        vote_average: Some(8.1),
        overview: Some("Overview".to_string()),
    }
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (endpoint, _app) = start_appwrite().await;
    let appwrite = client(&endpoint, Some("watchlist"));

    assert_eq!(appwrite.current_session().await, None);

    let session = appwrite.login("ada@example.com", "hunter22").await.unwrap();
    assert_eq!(session.user_id.as_deref(), Some("u1"));
    assert_eq!(session.display_name.as_deref(), Some("Ada"));
    assert!(appwrite.current_session().await.is_some());

    appwrite.logout().await.unwrap();
    assert_eq!(appwrite.current_session().await, None);
    // Logging out twice is harmless
    appwrite.logout().await.unwrap();
}

#[tokio::test]
async fn test_wrong_password_is_reported() {
    let (endpoint, _app) = start_appwrite().await;
    let appwrite = client(&endpoint, Some("watchlist"));

    let err = appwrite.login("ada@example.com", "nope").await.unwrap_err();

    assert_eq!(
        err.user_message(),
        "Invalid credentials. Please check the email and password."
    );
}

#[tokio::test]
async fn test_signup_then_signed_in() {
    let (endpoint, _app) = start_appwrite().await;
    let appwrite = client(&endpoint, Some("watchlist"));

    let session = appwrite
        .signup("ada@example.com", "hunter22", "Ada")
        .await
        .unwrap();

    assert_eq!(session.user_id.as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_watchlist_document_lifecycle() {
    let (endpoint, app) = start_appwrite().await;
    let appwrite = client(&endpoint, Some("watchlist"));
    appwrite.login("ada@example.com", "hunter22").await.unwrap();
    appwrite.verify_access("u1").await.unwrap();

    let created = appwrite.create("u1", &movie(42, "Answer")).await.unwrap();
    let again = appwrite.create("u1", &movie(42, "Answer")).await.unwrap();
    appwrite.create("u1", &movie(7, "Seven")).await.unwrap();

    assert_eq!(created.remote_document_id.as_deref(), Some("doc1"));
    assert_eq!(again, created);

    {
        let backend = app.0.lock().unwrap();
        assert_eq!(backend.posted.len(), 2);
        let first = &backend.posted[0];
        assert_eq!(first["documentId"], "unique()");
        assert_eq!(
            first["data"],
            json!({"userId": "u1", "movieId": "42", "title": "Answer", "poster_path": "/poster.jpg"})
        );
        assert_eq!(
            first["permissions"],
            json!([r#"read("user:u1")"#, r#"update("user:u1")"#, r#"delete("user:u1")"#])
        );
    }

    let ids: Vec<i64> = appwrite
        .find_by_owner("u1")
        .await
        .unwrap()
        .iter()
        .map(|entry| entry.movie.id)
        .collect();
    assert_eq!(ids, vec![7, 42]);
    assert!(appwrite.find_by_owner("someone-else").await.unwrap().is_empty());

    appwrite.delete("doc1").await.unwrap();
    assert!(matches!(
        appwrite.delete("doc1").await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(appwrite.find_one("u1", 42).await.unwrap(), None);
}

#[tokio::test]
async fn test_verify_access_rejects_other_owner() {
    let (endpoint, _app) = start_appwrite().await;
    let appwrite = client(&endpoint, Some("watchlist"));
    appwrite.login("ada@example.com", "hunter22").await.unwrap();

    assert!(matches!(
        appwrite.verify_access("u2").await,
        Err(AppError::AuthRequired)
    ));
}

#[tokio::test]
async fn test_missing_collection_is_config_error() {
    let (endpoint, _app) = start_appwrite().await;
    let appwrite = client(&endpoint, Some("not-a-collection"));
    appwrite.login("ada@example.com", "hunter22").await.unwrap();

    match appwrite.verify_access("u1").await {
        Err(AppError::Config(message)) => {
            assert!(message.contains("APPWRITE_WATCHLIST_COLLECTION_ID"))
        }
        other => panic!("expected config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_denied_write_is_config_error() {
    let (endpoint, app) = start_appwrite().await;
    app.0.lock().unwrap().deny_writes = true;
    let appwrite = client(&endpoint, Some("watchlist"));
    appwrite.login("ada@example.com", "hunter22").await.unwrap();

    match appwrite.create("u1", &movie(1, "One")).await {
        Err(AppError::Config(message)) => assert!(message.contains("create documents")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_collection_id_is_unavailable() {
    let (endpoint, _app) = start_appwrite().await;
    let appwrite = client(&endpoint, None);

    assert!(matches!(
        appwrite.find_by_owner("u1").await,
        Err(AppError::StoreUnavailable)
    ));
}
