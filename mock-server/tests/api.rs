use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, User, PASSWORD, USERNAME};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- login ---

#[tokio::test]
async fn login_with_valid_credentials() {
    let body = json!({"username": USERNAME, "password": PASSWORD}).to_string();
    let resp = app()
        .oneshot(json_request("POST", "/api/login", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"status": true, "data": {"id": 1, "username": "patrick115"}}));
}

#[tokio::test]
async fn login_with_wrong_password() {
    let body = json!({"username": USERNAME, "password": "nope"}).to_string();
    let resp = app()
        .oneshot(json_request("POST", "/api/login", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"status": false, "error": "invalid credentials"}));
}

#[tokio::test]
async fn login_malformed_body_returns_issue_list() {
    let resp = app()
        .oneshot(json_request("POST", "/api/login", r#"{"username":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], false);
    assert!(body["error"]["issues"].as_array().is_some_and(|issues| issues.len() == 1));
}

// --- users ---

#[tokio::test]
async fn get_user_found() {
    let resp = app().oneshot(empty_request("GET", "/api/users/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let user: User = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(user.username, USERNAME);
}

#[tokio::test]
async fn get_user_not_found() {
    let resp = app().oneshot(empty_request("GET", "/api/users/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"status": false, "error": "user not found"}));
}

#[tokio::test]
async fn get_user_bad_id_returns_400() {
    let resp = app().oneshot(empty_request("GET", "/api/users/abc")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- raw endpoints ---

#[tokio::test]
async fn echo_returns_body_and_content_type() {
    let resp = app()
        .oneshot(json_request("POST", "/api/echo", r#"{"a":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["data"]["body"], r#"{"a":1}"#);
    assert_eq!(body["data"]["content_type"], "application/json");
}

#[tokio::test]
async fn broken_returns_plain_text() {
    let resp = app().oneshot(empty_request("GET", "/api/broken")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], b"not valid json");
}

#[tokio::test]
async fn binary_is_not_utf8() {
    let resp = app().oneshot(empty_request("GET", "/api/binary")).await.unwrap();

    let bytes = body_bytes(resp).await;
    assert!(std::str::from_utf8(&bytes).is_err());
}

#[tokio::test]
async fn large_wraps_a_long_string() {
    let resp = app().oneshot(empty_request("GET", "/api/large")).await.unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], true);
    assert_eq!(body["data"].as_str().map(str::len), Some(mock_server::LARGE_LEN));
}

// --- full lifecycle ---

#[tokio::test]
async fn user_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // rename
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PUT", "/api/users/1", r#"{"username":"renamed"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["data"]["username"], "renamed");

    // old name no longer logs in
    let login = json!({"username": USERNAME, "password": PASSWORD}).to_string();
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/login", &login))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", "/api/users/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"status": true, "data": null}));

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/api/users/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // every api call above was counted
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/stats"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["hits"], 4);
}
