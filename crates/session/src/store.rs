//! Durable session store
//!
//! File-backed key/value store for session records plus the file-lock
//! primitive that serializes session creation across worker processes.
//! The filesystem is the only shared resource between workers; the
//! atomic create-exclusive open on the lock file is the sole
//! serialization point. Reads and waits interleave arbitrarily with it.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, trace};

use crate::config::StoreConfig;
use crate::error::{SessionError, SessionResult};
use crate::record::SessionRecord;

/// Backend-agnostic store contract.
///
/// Any backend must honor the same semantics the filesystem backend
/// provides: `try_lock` is atomic create-exclusive (at most one caller
/// across all processes gets `true` until `unlock`), `write` is never
/// observable half-written, and `wait_for_session` returns only once
/// `read` would succeed or the wait budget is spent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a record; `Ok(None)` when it has never been written.
    async fn read(&self, cache_key: &str) -> SessionResult<Option<SessionRecord>>;

    /// Persist a record. Concurrent readers see either nothing or the
    /// complete record, never a prefix.
    async fn write(&self, cache_key: &str, record: &SessionRecord) -> SessionResult<()>;

    /// Try to become the creator for `cache_key`. `Ok(false)` means
    /// another worker holds the lock. Expected contention, not a fault.
    async fn try_lock(&self, cache_key: &str) -> SessionResult<bool>;

    /// Release the creator lock. Idempotent: releasing an
    /// already-removed lock is a no-op.
    async fn unlock(&self, cache_key: &str) -> SessionResult<()>;

    /// Block until a record for `cache_key` is readable, or fail with
    /// [`SessionError::WaitTimeout`] once the budget elapses.
    async fn wait_for_session(&self, cache_key: &str) -> SessionResult<()>;
}

/// Filesystem-backed [`SessionStore`].
///
/// Layout under the configured root:
/// - `<cacheKey>.session.json` - serialized [`SessionRecord`]
/// - `<cacheKey>.lock` - existence marks a creation in progress; the
///   millisecond timestamp inside is diagnostic only and never read back
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    config: StoreConfig,
}

impl FileSessionStore {
    /// Create a store, ensuring the cache directory exists.
    pub async fn new(config: StoreConfig) -> SessionResult<Self> {
        fs::create_dir_all(&config.root).await?;
        info!("Session store at {:?}", config.root);
        Ok(Self { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the record file for `cache_key`.
    pub fn session_path(&self, cache_key: &str) -> PathBuf {
        self.config.root.join(format!("{cache_key}.session.json"))
    }

    /// Path of the lock marker for `cache_key`.
    pub fn lock_path(&self, cache_key: &str) -> PathBuf {
        self.config.root.join(format!("{cache_key}.lock"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn read(&self, cache_key: &str) -> SessionResult<Option<SessionRecord>> {
        let path = self.session_path(cache_key);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record =
            serde_json::from_slice(&raw).map_err(|source| SessionError::CorruptSessionData {
                cache_key: cache_key.to_string(),
                path,
                source,
            })?;
        Ok(Some(record))
    }

    async fn write(&self, cache_key: &str, record: &SessionRecord) -> SessionResult<()> {
        let data = serde_json::to_vec_pretty(record).map_err(SessionError::Serialization)?;

        // Write-then-rename so a concurrent poller never parses a
        // half-written file. The pid suffix keeps temp names unique
        // across workers sharing the directory.
        let path = self.session_path(cache_key);
        let tmp = self
            .config
            .root
            .join(format!("{cache_key}.session.json.tmp.{}", std::process::id()));
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &path).await?;

        debug!("Wrote session '{}' ({} bytes)", cache_key, data.len());
        Ok(())
    }

    async fn try_lock(&self, cache_key: &str) -> SessionResult<bool> {
        let path = self.lock_path(cache_key);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                trace!("Lock '{}' held elsewhere", cache_key);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        // Timestamp is for humans inspecting a stuck run; no code path
        // reads it back.
        let stamp = chrono::Utc::now().timestamp_millis().to_string();
        file.write_all(stamp.as_bytes()).await?;
        debug!("Acquired lock '{}'", cache_key);
        Ok(true)
    }

    async fn unlock(&self, cache_key: &str) -> SessionResult<()> {
        match fs::remove_file(self.lock_path(cache_key)).await {
            Ok(()) => {
                debug!("Released lock '{}'", cache_key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn wait_for_session(&self, cache_key: &str) -> SessionResult<()> {
        let start = Instant::now();
        debug!(
            "Waiting up to {:?} for session '{}'",
            self.config.wait_timeout, cache_key
        );

        loop {
            if self.read(cache_key).await?.is_some() {
                debug!(
                    "Session '{}' appeared after {:?}",
                    cache_key,
                    start.elapsed()
                );
                return Ok(());
            }

            if start.elapsed() >= self.config.wait_timeout {
                return Err(SessionError::WaitTimeout {
                    cache_key: cache_key.to_string(),
                    timeout: self.config.wait_timeout,
                });
            }

            // Whether the lock is still held or already released makes
            // no difference to the waiter; only the record ends the wait.
            let locked = fs::try_exists(self.lock_path(cache_key))
                .await
                .unwrap_or(false);
            trace!("Session '{}' not ready (lock held: {})", cache_key, locked);

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
