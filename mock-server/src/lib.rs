use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub username: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Rename {
    pub username: String,
}

pub struct AppState {
    users: RwLock<HashMap<u32, User>>,
    hits: AtomicUsize,
}

impl AppState {
    fn hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}

pub type Db = Arc<AppState>;

pub const USERNAME: &str = "patrick115";
pub const PASSWORD: &str = "pepa1234";

fn seed() -> Db {
    let mut users = HashMap::new();
    users.insert(
        1,
        User {
            id: 1,
            username: USERNAME.to_string(),
        },
    );
    Arc::new(AppState {
        users: RwLock::new(users),
        hits: AtomicUsize::new(0),
    })
}

pub fn app() -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/users/{id}", get(get_user).put(rename_user).delete(delete_user))
        .route("/api/echo", post(echo).put(echo))
        .route("/api/broken", get(broken))
        .route("/api/legacy", get(legacy))
        .route("/api/binary", get(binary))
        .route("/api/large", get(large))
        .route("/stats", get(stats))
        .with_state(seed())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

fn success(data: impl Serialize) -> Json<Value> {
    Json(json!({"status": true, "data": data}))
}

fn failure(status: StatusCode, error: impl Serialize) -> (StatusCode, Json<Value>) {
    (status, Json(json!({"status": false, "error": error})))
}

fn rejected(rejection: JsonRejection) -> (StatusCode, Json<Value>) {
    failure(
        StatusCode::BAD_REQUEST,
        json!({"issues": [{"path": "", "message": rejection.body_text()}]}),
    )
}

async fn login(
    State(db): State<Db>,
    input: Result<Json<Login>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    db.hit();
    let Json(input) = input.map_err(rejected)?;
    let users = db.users.read().await;
    users
        .values()
        .find(|user| user.username == input.username && input.password == PASSWORD)
        .map(success)
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "invalid credentials"))
}

async fn get_user(
    State(db): State<Db>,
    Path(id): Path<u32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    db.hit();
    let users = db.users.read().await;
    users
        .get(&id)
        .map(success)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "user not found"))
}

async fn rename_user(
    State(db): State<Db>,
    Path(id): Path<u32>,
    input: Result<Json<Rename>, JsonRejection>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    db.hit();
    let Json(input) = input.map_err(rejected)?;
    let mut users = db.users.write().await;
    let user = users
        .get_mut(&id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "user not found"))?;
    user.username = input.username;
    Ok(success(&*user))
}

async fn delete_user(
    State(db): State<Db>,
    Path(id): Path<u32>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    db.hit();
    let mut users = db.users.write().await;
    users
        .remove(&id)
        .map(|_| success(Value::Null))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "user not found"))
}

/// Echo the raw request body and its content type.
async fn echo(State(db): State<Db>, headers: HeaderMap, body: String) -> Json<Value> {
    db.hit();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    success(json!({"body": body, "content_type": content_type}))
}

async fn broken(State(db): State<Db>) -> (StatusCode, &'static str) {
    db.hit();
    (StatusCode::OK, "not valid json")
}

async fn legacy(State(db): State<Db>) -> Json<Value> {
    db.hit();
    Json(json!({"ok": true, "message": "moved"}))
}

/// Bytes that are not valid UTF-8.
async fn binary(State(db): State<Db>) -> (StatusCode, Vec<u8>) {
    db.hit();
    (StatusCode::OK, b"no\xff!".to_vec())
}

/// Size of the `data` string served by `/api/large`, above ureq's default
/// 10 MiB read limit.
pub const LARGE_LEN: usize = 11 * 1024 * 1024;

async fn large(State(db): State<Db>) -> Json<Value> {
    db.hit();
    success("a".repeat(LARGE_LEN))
}

async fn stats(State(db): State<Db>) -> Json<Value> {
    Json(json!({"hits": db.hits.load(Ordering::SeqCst)}))
}
