//! Session coordinator
//!
//! Get-or-create orchestration over the store and the login executor.
//! Safe under many concurrent worker processes targeting the same
//! cache key: at most one of them ever runs the login flow, the rest
//! read the cached record or wait for it to appear.

use std::collections::HashMap;
use std::sync::Arc;

use harness_browser::BrowserEngine;
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::login::{create_session, LoginFlowConfig};
use crate::record::{cache_key, SessionRecord};
use crate::store::SessionStore;

/// Flow key used when a request does not name one
pub const DEFAULT_LOGIN_KEY: &str = "default";

/// Cross-worker session coordinator.
///
/// Holds the store, the browser engine, and an explicit registry of
/// login flows keyed by login key. Flows are registered up front;
/// nothing is resolved by naming convention at call time.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    engine: Arc<dyn BrowserEngine>,
    flows: HashMap<String, LoginFlowConfig>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, engine: Arc<dyn BrowserEngine>) -> Self {
        Self {
            store,
            engine,
            flows: HashMap::new(),
        }
    }

    /// Register a login flow under `login_key`. Requests that pass no
    /// login key use the flow registered as [`DEFAULT_LOGIN_KEY`].
    pub fn register_flow(mut self, login_key: impl Into<String>, config: LoginFlowConfig) -> Self {
        self.flows.insert(login_key.into(), config);
        self
    }

    pub(crate) fn engine(&self) -> &Arc<dyn BrowserEngine> {
        &self.engine
    }

    /// Get the cached session for `user_key`, creating it if this is
    /// the first request for its cache key anywhere in the run.
    ///
    /// `login_key` selects the authentication procedure and
    /// disambiguates the cache key (`<loginKey>__<userKey>`), so two
    /// flows for the same user never collide.
    ///
    /// Exactly one worker runs the (expensive, browser-launching)
    /// login flow per cache key; a worker that loses the lock race
    /// only polls for the record. A creator that fails releases the
    /// lock, leaving the key free for a later attempt.
    pub async fn get_session(
        &self,
        user_key: &str,
        login_key: Option<&str>,
    ) -> SessionResult<SessionRecord> {
        let key = cache_key(user_key, login_key);

        // Cache hit: no lock interaction at all.
        if let Some(existing) = self.store.read(&key).await? {
            debug!("Session cache hit for '{}'", key);
            return Ok(existing);
        }

        if self.store.try_lock(&key).await? {
            info!("Creating session '{}'", key);
            let result = self.create_and_persist(user_key, login_key, &key).await;
            // Release also on error; a failed creation must not wedge
            // the key for every other worker.
            if let Err(e) = self.store.unlock(&key).await {
                warn!("Failed to release lock '{}': {}", key, e);
            }
            return result;
        }

        debug!("Session '{}' is being created elsewhere, waiting", key);
        self.store.wait_for_session(&key).await?;

        match self.store.read(&key).await? {
            Some(record) => Ok(record),
            None => Err(SessionError::NotCreatedAfterWait { cache_key: key }),
        }
    }

    async fn create_and_persist(
        &self,
        user_key: &str,
        login_key: Option<&str>,
        key: &str,
    ) -> SessionResult<SessionRecord> {
        let flow_key = login_key.unwrap_or(DEFAULT_LOGIN_KEY);
        let config = self
            .flows
            .get(flow_key)
            .ok_or_else(|| SessionError::UnknownLoginFlow(flow_key.to_string()))?;

        let record = create_session(self.engine.as_ref(), user_key, config).await?;
        self.store.write(key, &record).await?;
        info!("Session '{}' created and persisted", key);
        Ok(record)
    }
}
