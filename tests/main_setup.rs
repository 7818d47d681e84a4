use quill::{
    AppConfig,
    config::{ConfigError, DEFAULT_SESSION_TTL_SECS, Env},
};
use serial_test::serial;
use std::{env, panic};

const VARS: [&str; 5] = [
    "APP_ENV",
    "DATABASE_URL",
    "SESSION_SECRET",
    "SESSION_TTL_SECS",
    "BIND_ADDR",
];

const GOOD_SECRET: &str = "a-session-secret-of-at-least-32-bytes!";

// --- Setup/Teardown Utilities ---

/// Runs `test` against a clean slate of the config variables, applying `vars` first,
/// and restores the original environment afterward.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_missing_session_secret_is_fatal() {
    let result = run_with_env(&[], AppConfig::load);
    assert_eq!(result.err(), Some(ConfigError::Missing("SESSION_SECRET")));

    let result = run_with_env(
        &[("APP_ENV", "production"), ("DATABASE_URL", "sqlite://prod.db")],
        AppConfig::load,
    );
    assert_eq!(result.err(), Some(ConfigError::Missing("SESSION_SECRET")));
}

#[test]
#[serial]
fn test_short_session_secret_is_rejected() {
    let result = run_with_env(&[("SESSION_SECRET", "too-short")], AppConfig::load);
    assert_eq!(result.err(), Some(ConfigError::WeakSecret));
}

#[test]
#[serial]
fn test_production_requires_database_url() {
    let result = run_with_env(
        &[("APP_ENV", "production"), ("SESSION_SECRET", GOOD_SECRET)],
        AppConfig::load,
    );
    assert_eq!(result.err(), Some(ConfigError::Missing("DATABASE_URL")));
}

#[test]
#[serial]
fn test_local_defaults() {
    let config = run_with_env(&[("SESSION_SECRET", GOOD_SECRET)], AppConfig::load)
        .expect("local configuration should load");

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.db_url, "sqlite://quill.db?mode=rwc");
    assert_eq!(config.session_secret, GOOD_SECRET);
    assert_eq!(config.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_production_config_loads() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "sqlite:///var/lib/quill/quill.db"),
            ("SESSION_SECRET", GOOD_SECRET),
            ("SESSION_TTL_SECS", "3600"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ],
        AppConfig::load,
    )
    .expect("production configuration should load");

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.db_url, "sqlite:///var/lib/quill/quill.db");
    assert_eq!(config.session_ttl_secs, 3600);
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
}

#[test]
#[serial]
fn test_invalid_session_ttl_is_rejected() {
    for raw in ["0", "-5", "a day"] {
        let result = run_with_env(
            &[("SESSION_SECRET", GOOD_SECRET), ("SESSION_TTL_SECS", raw)],
            AppConfig::load,
        );
        assert_eq!(
            result.err(),
            Some(ConfigError::Invalid {
                name: "SESSION_TTL_SECS",
                value: raw.to_string(),
            })
        );
    }
}

#[test]
fn test_default_config_is_usable_for_tests() {
    let config = AppConfig::default();

    assert_eq!(config.db_url, "sqlite::memory:");
    assert!(config.session_secret.len() >= quill::config::MIN_SECRET_LEN);
    assert!(config.session_ttl_secs > 0);
}
