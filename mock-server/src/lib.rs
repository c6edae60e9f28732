use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const RECENT_LIMIT: usize = 20;
pub const DESCRIPTION_LIMIT: usize = 250;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub username: String,
    pub feedname: String,
    pub raw: String,
    pub timestamp: f64,
    pub entry_id: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeedType {
    #[default]
    Security,
    Content,
}

#[derive(Debug, Deserialize)]
pub struct CreateList {
    pub user: String,
    pub listname: String,
    pub description: Option<String>,
    #[serde(default = "default_expiration")]
    pub expiration: i64,
    #[serde(default)]
    pub feed_type: FeedType,
    #[serde(default)]
    pub private: bool,
}

fn default_expiration() -> i64 {
    8766
}

#[derive(Debug, Deserialize)]
pub struct AddEntry {
    pub entry: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub indicator: String,
}

#[derive(Clone, Debug)]
pub struct List {
    pub private: bool,
    pub entries: Vec<Entry>,
}

pub type Db = Arc<RwLock<HashMap<(String, String), List>>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
}

pub fn app(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        db: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/v1/lists/{user}/", axum::routing::post(create_list))
        .route("/v1/lists/{user}/{list}/", get(get_recent).post(add_entry))
        .route("/v1/lists/{user}/{list}/indicators/unique", get(get_unique))
        .route("/v1/indicator/entries", get(search))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "result": "error", "message": message.into() })),
    )
        .into_response()
}

fn success() -> Response {
    Json(json!({ "result": "success" })).into_response()
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body)
        .map_err(|e| error(StatusCode::BAD_REQUEST, format!("invalid request body: {e}")))
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if key != Some(&*state.api_key) {
        tracing::debug!(path = %request.uri().path(), "rejected request with bad API key");
        return error(StatusCode::UNAUTHORIZED, "invalid API key");
    }
    next.run(request).await
}

async fn create_list(State(state): State<AppState>, Path(user): Path<String>, body: Bytes) -> Response {
    let input: CreateList = match parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    if input.user != user {
        return error(StatusCode::BAD_REQUEST, "user does not match the request path");
    }
    if input.listname.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "listname is required");
    }
    if input.expiration < 1 {
        return error(StatusCode::BAD_REQUEST, "expiration must be positive");
    }
    if input
        .description
        .as_ref()
        .is_some_and(|d| d.chars().count() > DESCRIPTION_LIMIT)
    {
        return error(StatusCode::BAD_REQUEST, "description is too long");
    }

    let mut lists = state.db.write().await;
    let key = (user, input.listname);
    if lists.contains_key(&key) {
        return error(StatusCode::BAD_REQUEST, "list already exists");
    }
    tracing::info!(user = %key.0, list = %key.1, feed_type = ?input.feed_type, "list created");
    lists.insert(
        key,
        List {
            private: input.private,
            entries: Vec::new(),
        },
    );
    success()
}

async fn get_recent(State(state): State<AppState>, Path((user, list)): Path<(String, String)>) -> Response {
    let lists = state.db.read().await;
    let Some(found) = lists.get(&(user, list)) else {
        return error(StatusCode::NOT_FOUND, "list not found");
    };
    let entries: Vec<Entry> = found.entries.iter().rev().take(RECENT_LIMIT).cloned().collect();
    Json(json!({ "entries": entries })).into_response()
}

async fn add_entry(
    State(state): State<AppState>,
    Path((user, list)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let input: AddEntry = match parse_body(&body) {
        Ok(input) => input,
        Err(resp) => return resp,
    };
    if input.entry.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "entry is required");
    }

    let mut lists = state.db.write().await;
    let Some(found) = lists.get_mut(&(user.clone(), list.clone())) else {
        return error(StatusCode::NOT_FOUND, "list not found");
    };
    found.entries.push(Entry {
        username: user,
        feedname: list,
        raw: input.entry,
        timestamp: chrono::Utc::now().timestamp_millis() as f64,
        entry_id: Uuid::new_v4().to_string(),
    });
    success()
}

/// The indicator of an entry is its first whitespace-separated token.
fn indicator(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or_default()
}

async fn get_unique(State(state): State<AppState>, Path((user, list)): Path<(String, String)>) -> Response {
    let lists = state.db.read().await;
    let Some(found) = lists.get(&(user, list)) else {
        return error(StatusCode::NOT_FOUND, "list not found");
    };
    let mut seen = Vec::new();
    for entry in &found.entries {
        let value = indicator(&entry.raw);
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    let mut body = seen.join("\n");
    body.push('\n');
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let lists = state.db.read().await;
    let results: Vec<Entry> = lists
        .values()
        .filter(|list| !list.private)
        .flat_map(|list| list.entries.iter())
        .filter(|entry| entry.raw.contains(&params.indicator))
        .cloned()
        .collect();
    Json(json!({ "search_results": results })).into_response()
}
