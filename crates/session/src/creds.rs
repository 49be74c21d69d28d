//! Environment credential resolver
//!
//! Credentials live in the worker environment as `<KEY>_USERNAME` /
//! `<KEY>_PASSWORD` pairs (e.g. `ADMIN_USERNAME`). Resolution is pure:
//! no I/O beyond the environment lookup, no side effects.

use crate::error::{SessionError, SessionResult};

/// A resolved username/password pair
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Resolve credentials for `user_key` from the process environment.
///
/// The key is normalized to uppercase before lookup, so `admin` and
/// `ADMIN` resolve the same pair. Fails with
/// [`SessionError::MissingCredentials`] naming both expected variables
/// when either is absent or empty.
pub fn resolve_creds(user_key: &str) -> SessionResult<Credentials> {
    resolve_creds_with(user_key, |var| std::env::var(var).ok())
}

/// Like [`resolve_creds`], but reading from an injected lookup.
pub fn resolve_creds_with(
    user_key: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> SessionResult<Credentials> {
    let normalized = user_key.to_uppercase();
    let username_var = format!("{normalized}_USERNAME");
    let password_var = format!("{normalized}_PASSWORD");

    let username = lookup(&username_var).filter(|v| !v.is_empty());
    let password = lookup(&password_var).filter(|v| !v.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials { username, password }),
        _ => Err(SessionError::MissingCredentials {
            user_key: user_key.to_string(),
            username_var,
            password_var,
        }),
    }
}
