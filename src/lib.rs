use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Identity, sessions and access control.
pub mod accounts;
pub mod auth;
pub mod guard;
pub mod password;
pub mod session;

// Content and persistence.
pub mod models;
pub mod repository;
pub mod sanitize;
pub mod validation;

// HTTP surface and configuration.
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

use auth::CurrentUser;
use error::AppError;
use guard::Decision;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{RepositoryState, SqliteRepository};
pub use session::SessionCodec;

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::dashboard, handlers::register_user, handlers::login_user, handlers::logout,
        handlers::get_post, handlers::create_post, handlers::edit_post_form,
        handlers::update_post, handlers::delete_post
    ),
    components(
        schemas(
            models::Post, models::CredentialsForm, models::PostForm, models::ErrorList,
            models::UserSummary, models::PostSummary, models::DashboardView,
            models::PostView, models::EditablePost,
        )
    ),
    tags(
        (name = "quill", description = "Quill publishing API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single immutable container shared by all requests. The codec already holds the
/// signing key taken from `config` at startup.
#[derive(Clone)]
pub struct AppState {
    /// Credential and post stores.
    pub repo: RepositoryState,
    /// Session token signer/verifier.
    pub codec: SessionCodec,
    /// The loaded configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            repo,
            codec: SessionCodec::from_config(&config),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionCodec {
    fn from_ref(app_state: &AppState) -> SessionCodec {
        app_state.codec.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Route-level gate for `authenticated_routes`. Anonymous requests are answered with a
/// redirect home without running the handler.
async fn auth_middleware(
    CurrentUser(identity): CurrentUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if guard::require_authenticated(&identity) == Decision::Denied {
        tracing::debug!(uri = %request.uri(), "anonymous request to a protected route");
        return Err(AppError::Denied);
    }
    Ok(next.run(request).await)
}

/// create_router
///
/// Assembles the routes, the identity resolver, the observability layers and the state.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: identity is resolved but not required.
        .merge(public::public_routes())
        // Authenticated Routes: anonymous requests stop at `auth_middleware`.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn(auth_middleware)),
        )
        // Identity Resolver: runs for every route, before any route-level gate.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::resolve_identity,
        ))
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span for one HTTP request, correlated by the `x-request-id` header. The cookie
/// header is never recorded.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
