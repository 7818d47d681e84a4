use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Post mutation endpoints. The router is wrapped in `auth_middleware`, so anonymous
/// requests are redirected before reaching a handler; edit and delete additionally pass
/// the ownership guard inside the handler.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /posts
        // Publishes a post owned by the signed-in user.
        .route("/posts", post(handlers::create_post))
        // GET/POST /posts/{id}/edit
        // Edit form source and submission. Owner only.
        .route(
            "/posts/{id}/edit",
            get(handlers::edit_post_form).post(handlers::update_post),
        )
        // POST /posts/{id}/delete
        // Owner only.
        .route("/posts/{id}/delete", post(handlers::delete_post))
}
