//! Error types for the session cache

use std::path::PathBuf;
use std::time::Duration;

use harness_browser::BrowserError;
use thiserror::Error;

/// Result type alias using [`SessionError`]
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Session cache error taxonomy.
///
/// Nothing here is retried internally: every failure surfaces to the
/// calling test, which fails. Retry policy belongs to the caller.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Required credential env vars are absent or empty. A
    /// misconfigured environment cannot self-correct, so this is
    /// raised before any browser resource is touched.
    #[error("missing credentials for user '{user_key}': expected env vars {username_var}, {password_var}")]
    MissingCredentials {
        user_key: String,
        username_var: String,
        password_var: String,
    },

    /// An on-disk record exists but does not parse. Writes go through
    /// a rename, so this means something external touched the file.
    #[error("corrupt session data for '{cache_key}' at {path}: {source}")]
    CorruptSessionData {
        cache_key: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A waiter exhausted its budget. The lock may still be held by a
    /// slow creator, or orphaned by a crashed one; the waiter cannot
    /// tell the difference.
    #[error("timed out after {timeout:?} waiting for session '{cache_key}'")]
    WaitTimeout { cache_key: String, timeout: Duration },

    /// Defensive check: the wait reported success but no record is
    /// readable. Indicates external deletion or a logic error.
    #[error("session '{cache_key}' not present after wait completed")]
    NotCreatedAfterWait { cache_key: String },

    #[error("no login flow registered for key '{0}'")]
    UnknownLoginFlow(String),

    /// The caller-supplied login flow failed; propagated after browser
    /// teardown with the flow's own error as the source.
    #[error("login flow failed for user '{user_key}'")]
    LoginFlow {
        user_key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("serialization error: {0}")]
    Serialization(serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
