use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::{models::ErrorList, repository::RepoError, session::TokenError};

/// The one message shown for every failed login, whichever check failed.
pub const INVALID_CREDENTIALS: &str = "Invalid username / password.";

/// The one message shown when a username is taken.
pub const USERNAME_TAKEN: &str = "That username is already taken.";

/// Where denied and not-found requests are sent.
pub const SAFE_DEFAULT_PATH: &str = "/";

/// AppError
///
/// Everything a handler can fail with, and how each is shown to the client:
/// form problems are listed back (422), authorization and lookup failures are a
/// silent redirect to the home page, anything else is a logged 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not permitted")]
    Denied,
    #[error("not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The user-visible messages for form-level failures, in order.
    pub fn messages(&self) -> Vec<String> {
        match self {
            AppError::Validation(errors) => errors.clone(),
            AppError::InvalidCredentials => vec![INVALID_CREDENTIALS.to_string()],
            _ => Vec::new(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Duplicate => AppError::Validation(vec![USERNAME_TAKEN.to_string()]),
            RepoError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::Internal(format!("password hashing failed: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(_) | AppError::InvalidCredentials => {
                let body = ErrorList {
                    errors: self.messages(),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            AppError::Denied | AppError::NotFound => {
                Redirect::to(SAFE_DEFAULT_PATH).into_response()
            }
            AppError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
