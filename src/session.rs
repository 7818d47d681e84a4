use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Claims
///
/// Wire payload of a session token. All timestamps are Unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user id, as a string per RFC 7519.
    pub sub: String,
    pub username: String,
    /// Issued At (iat).
    pub iat: i64,
    /// Expiration Time (exp): fixed at issue time as `iat + window`.
    pub exp: i64,
    /// Token id: random issuance marker, unique per token.
    pub jti: Uuid,
}

/// SessionClaim
///
/// The verified identity facts carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionClaim {
    pub user_id: i64,
    pub username: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub token_id: Uuid,
}

/// A freshly signed token together with the claim it encodes.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claim: SessionClaim,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Corrupt, tampered, wrongly signed or expired. Deliberately carries no detail.
    #[error("invalid session token")]
    Invalid,
    #[error("failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// SessionCodec
///
/// Signs and verifies self-contained HS256 session tokens. The key is taken from the
/// immutable `AppConfig` once, at construction.
///
/// There is no server-side revocation: logging out only deletes the client cookie, so a
/// copied token stays valid until `exp`.
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl SessionCodec {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.session_secret.as_bytes(), config.session_ttl_secs)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issues a token for the given identity, valid from now for the configured window.
    pub fn issue(&self, user_id: i64, username: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, username, Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `issued_at` (Unix seconds).
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        issued_at: i64,
    ) -> Result<IssuedToken, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            claim: SessionClaim {
                user_id,
                username: claims.username,
                issued_at: claims.iat,
                expires_at: claims.exp,
                token_id: claims.jti,
            },
        })
    }

    /// Verifies signature and expiry. Every failure collapses into `TokenError::Invalid`.
    pub fn verify(&self, token: &str) -> Result<SessionClaim, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(kind = ?e.kind(), "session token rejected");
            TokenError::Invalid
        })?;
        let claims = data.claims;

        // `now < exp` is required; the library alone accepts `now == exp`.
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Invalid);
        }

        let user_id = claims.sub.parse::<i64>().map_err(|_| TokenError::Invalid)?;

        Ok(SessionClaim {
            user_id,
            username: claims.username,
            issued_at: claims.iat,
            expires_at: claims.exp,
            token_id: claims.jti,
        })
    }

    /// Builds the session cookie for a newly issued token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Strict)
            .max_age(time::Duration::seconds(self.ttl_secs))
            .build()
    }
}

/// A cookie value that, when removed from a jar, expires the client's session cookie.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
