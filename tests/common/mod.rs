//! Shared helpers for the integration tests: an app backed by in-memory SQLite and
//! small request/response utilities for driving it with `oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use quill::{
    AppConfig, AppState, create_router,
    repository::{self, RepositoryState, SqliteRepository},
};
use serde::de::DeserializeOwned;
use tower::util::ServiceExt;

/// Fresh state over an empty in-memory database.
pub async fn test_state() -> AppState {
    let pool = repository::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    repository::init_schema(&pool)
        .await
        .expect("Failed to create tables");

    let repo = Arc::new(SqliteRepository::new(pool)) as RepositoryState;
    AppState::new(repo, AppConfig::default())
}

/// The full router, including the identity resolver and the route gates.
pub async fn test_app() -> (Router, AppState) {
    let state = test_state().await;
    (create_router(state.clone()), state)
}

/// Encodes `pairs` as an `application/x-www-form-urlencoded` body.
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds a urlencoded form request, optionally carrying a `Cookie` header.
pub fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// The raw `Set-Cookie` header of a response, if any.
pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// The `name=value` pair from `Set-Cookie`, ready to send back as a `Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookie_header(response)
        .and_then(|raw| raw.split(';').next().map(str::to_string))
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    serde_json::from_slice(&body_bytes(response).await).expect("response body is not the expected JSON")
}

/// Registers a user through the HTTP surface and returns their session cookie.
pub async fn register(app: &Router, username: &str, password: &str) -> String {
    let response = send(
        app,
        form_request(
            "/register",
            &form_body(&[("username", username), ("password", password)]),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "registration of {username} failed");
    session_cookie(&response).expect("registration did not set a session cookie")
}

/// Creates a post and returns its id, taken from the redirect location.
pub async fn create_post(app: &Router, cookie: &str, title: &str, body: &str) -> i64 {
    let response = send(
        app,
        form_request(
            "/posts",
            &form_body(&[("title", title), ("body", body)]),
            Some(cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    location(&response)
        .and_then(|loc| loc.strip_prefix("/posts/").map(str::to_string))
        .and_then(|id| id.parse().ok())
        .expect("create did not redirect to the new post")
}
