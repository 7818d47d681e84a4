//! Registration and login flows.
//!
//! Both end in a freshly issued session token of the same shape; the HTTP layer turns
//! it into the session cookie.

use std::sync::OnceLock;

use crate::{
    error::{AppError, USERNAME_TAKEN},
    models::CredentialsForm,
    password::PasswordHasher,
    repository::Repository,
    session::{IssuedToken, SessionCodec},
    validation::{PASSWORD, Phase, USERNAME, validate},
};

/// register
///
/// Validates every rule before giving up, so the user sees all problems at once:
/// presence, then format, then the uniqueness lookup (even when the format is already
/// wrong), then length. The lookup is only a fast path; the store's constraint settles
/// concurrent registrations of the same name.
pub async fn register(
    repo: &dyn Repository,
    codec: &SessionCodec,
    form: &CredentialsForm,
) -> Result<IssuedToken, AppError> {
    let username = form.username.trim();
    let password = form.password.as_str();
    let fields = [(&USERNAME, username), (&PASSWORD, password)];

    let mut errors = validate(&fields, Phase::Presence);
    errors.extend(validate(&fields, Phase::Format));
    if !username.is_empty() && repo.find_user_by_username(username).await?.is_some() {
        errors.push(USERNAME_TAKEN.to_string());
    }
    errors.extend(validate(&fields, Phase::Length));

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "registration rejected");
        return Err(AppError::Validation(errors));
    }

    let password_hash = PasswordHasher::new().hash(password)?;
    let user = repo.create_user(username, &password_hash).await?;
    tracing::info!(user_id = user.id, "user registered");

    Ok(codec.issue(user.id, &user.username)?)
}

/// login
///
/// Every failure, whether a missing field, an unknown username or a wrong password,
/// is the same `AppError::InvalidCredentials`.
pub async fn login(
    repo: &dyn Repository,
    codec: &SessionCodec,
    form: &CredentialsForm,
) -> Result<IssuedToken, AppError> {
    let username = form.username.trim();
    let password = form.password.as_str();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let hasher = PasswordHasher::new();
    let Some(user) = repo.find_user_by_username(username).await? else {
        // Spend a verification anyway so unknown names are not answered faster.
        if let Some(hash) = dummy_hash(&hasher) {
            hasher.verify(password, hash);
        }
        tracing::info!("login failed");
        return Err(AppError::InvalidCredentials);
    };

    if !hasher.verify(password, &user.password_hash) {
        tracing::info!("login failed");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = user.id, "user logged in");
    Ok(codec.issue(user.id, &user.username)?)
}

fn dummy_hash(hasher: &PasswordHasher) -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hasher.hash("no-such-user-password").ok())
        .as_deref()
}
