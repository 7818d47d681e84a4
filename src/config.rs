use std::env;

use thiserror::Error;

/// Minimum accepted length, in bytes, of the session signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Default lifetime of a session token (and its cookie), in seconds.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60 * 24;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// immutable afterwards; handlers and extractors pull it out of the shared state via
/// `FromRef`. The signing secret lives here and is handed to the `SessionCodec` at
/// construction, so there is no process-wide mutable key.
#[derive(Clone)]
pub struct AppConfig {
    // SQLite connection string.
    pub db_url: String,
    // Runtime environment marker. Controls the log format and the database fallback.
    pub env: Env,
    // HMAC secret used to sign and verify session tokens.
    pub session_secret: String,
    // Token validity window in seconds. Also used as the cookie Max-Age.
    pub session_ttl_secs: i64,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: human-readable logs and a local database file in `Local`,
/// JSON logs and an explicit `DATABASE_URL` in `Production`.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,
    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests: in-memory database and a fixed secret.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            env: Env::Local,
            session_secret: "quill-test-secret-value-0123456789abcdef".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. A missing or weak
    /// `SESSION_SECRET` is an error in every environment: the caller must abort startup
    /// instead of running with sessions that can never verify.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let session_secret =
            env::var("SESSION_SECRET").map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;
        if session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        let db_url = match env {
            Env::Production => {
                env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?
            }
            Env::Local => env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://quill.db?mode=rwc".to_string()),
        };

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => match raw.parse::<i64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_TTL_SECS",
                        value: raw,
                    });
                }
            },
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            db_url,
            env,
            session_secret,
            session_ttl_secs,
            bind_addr,
        })
    }
}
