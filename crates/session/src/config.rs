//! Session store configuration

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Configuration for the file-backed session store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding `<cacheKey>.session.json` and
    /// `<cacheKey>.lock` files, shared by all workers of a run
    pub root: PathBuf,

    /// Sleep between polls while waiting for another worker's session
    pub poll_interval: Duration,

    /// Hard ceiling on how long a waiter polls before failing
    pub wait_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("build/sessions"),
            poll_interval: Duration::from_millis(200),
            wait_timeout: Duration::from_secs(40),
        }
    }
}

impl StoreConfig {
    /// Default intervals with a custom cache directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden from the environment:
    /// `SESSION_CACHE_DIR`, `SESSION_POLL_INTERVAL_MS`,
    /// `SESSION_WAIT_TIMEOUT_MS`. Unparsable values are ignored with
    /// a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("SESSION_CACHE_DIR") {
            if !dir.is_empty() {
                config.root = PathBuf::from(dir);
            }
        }
        if let Some(ms) = read_millis("SESSION_POLL_INTERVAL_MS") {
            config.poll_interval = ms;
        }
        if let Some(ms) = read_millis("SESSION_WAIT_TIMEOUT_MS") {
            config.wait_timeout = ms;
        }

        config
    }
}

fn read_millis(var: &str) -> Option<Duration> {
    let raw = std::env::var(var).ok()?;
    match raw.parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            warn!("Ignoring {}: '{}' is not a millisecond count", var, raw);
            None
        }
    }
}
