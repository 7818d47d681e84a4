use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints open to anonymous visitors: the account entry points and the read-only
/// views.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Dashboard: the current user and their posts, or an empty anonymous view.
        .route("/", get(handlers::dashboard))
        // POST /register
        // Creates an account and sets the session cookie (registration implies login).
        .route("/register", post(handlers::register_user))
        // POST /login
        .route("/login", post(handlers::login_user))
        // POST /logout
        // Client-side only: clears the cookie.
        .route("/logout", post(handlers::logout))
        // GET /posts/{id}
        // Rendered post with its author's username.
        .route("/posts/{id}", get(handlers::get_post))
}
