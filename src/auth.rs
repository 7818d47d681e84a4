use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    error::AppError,
    models::UserSummary,
    session::{SESSION_COOKIE, SessionClaim, SessionCodec},
};

/// Identity
///
/// Who is making the request. Resolved exactly once per request by
/// `resolve_identity` and stored in the request extensions.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Authenticated(SessionClaim),
    Anonymous,
}

impl Identity {
    pub fn claim(&self) -> Option<&SessionClaim> {
        match self {
            Identity::Authenticated(claim) => Some(claim),
            Identity::Anonymous => None,
        }
    }

    /// The "current user" as shown to views.
    pub fn summary(&self) -> Option<UserSummary> {
        self.claim().map(|claim| UserSummary {
            id: claim.user_id,
            username: claim.username.clone(),
        })
    }
}

/// resolve_identity
///
/// Global middleware. Reads the session cookie and verifies it; a missing cookie and a
/// cookie that fails verification both resolve to `Identity::Anonymous`. The request is
/// always passed on.
pub async fn resolve_identity(
    State(codec): State<SessionCodec>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match jar.get(SESSION_COOKIE) {
        Some(cookie) => match codec.verify(cookie.value()) {
            Ok(claim) => Identity::Authenticated(claim),
            Err(_) => Identity::Anonymous,
        },
        None => Identity::Anonymous,
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// CurrentUser Extractor
///
/// Hands the resolved identity to a handler. Never rejects: a request that did not
/// pass through `resolve_identity` is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or(Identity::Anonymous);
        Ok(CurrentUser(identity))
    }
}

/// AuthUser Extractor
///
/// An identity that passed the route-level gate. Used as an argument by every handler
/// that requires a signed-in user.
///
/// Rejection: `AppError::Denied`, rendered as a redirect to the home page.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub identity: Identity,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(CurrentUser(identity)) = CurrentUser::from_request_parts(parts, state).await;

        let Some(claim) = identity.claim() else {
            tracing::debug!(uri = %parts.uri, "anonymous request to a protected route");
            return Err(AppError::Denied);
        };

        Ok(AuthUser {
            id: claim.user_id,
            username: claim.username.clone(),
            identity: identity.clone(),
        })
    }
}
