//! Session-aware context provisioning
//!
//! Turns a cached [`SessionRecord`] into a ready-to-use browser
//! context (and page) for a consuming test. Without a user key this
//! degrades to plain anonymous provisioning, the common case for
//! unauthenticated tests.

use std::collections::HashMap;
use std::sync::Arc;

use harness_browser::{Browser, BrowserContext, ContextOptions, Page};
use tracing::warn;

use crate::error::SessionResult;
use crate::manager::SessionManager;
use crate::record::SessionRecord;

/// A provisioned context, together with the session it was seeded
/// from (if any) and the browser that owns it.
pub struct SessionContext {
    browser: Box<dyn Browser>,
    pub context: Box<dyn BrowserContext>,
    pub session: Option<SessionRecord>,
}

impl SessionContext {
    /// Out-of-band values saved during login (e.g. a bearer token for
    /// an HTTP client used alongside the browser). `None` for
    /// anonymous contexts.
    pub fn meta(&self) -> Option<&HashMap<String, String>> {
        self.session.as_ref().map(|s| &s.meta)
    }

    /// Close the context and its owning browser.
    pub async fn close(self) -> SessionResult<()> {
        if let Err(e) = self.context.close().await {
            warn!("Context close failed: {}", e);
        }
        self.browser.close().await?;
        Ok(())
    }
}

/// [`SessionContext`] plus an already-open page
pub struct OpenSession {
    pub page: Arc<dyn Page>,
    pub context: SessionContext,
}

impl OpenSession {
    pub fn session(&self) -> Option<&SessionRecord> {
        self.context.session.as_ref()
    }

    pub async fn close(self) -> SessionResult<()> {
        self.context.close().await
    }
}

impl SessionManager {
    /// Provision a browser context.
    ///
    /// With a `user_key` the session is fetched (or created) first and
    /// the context starts from its storage state; without one the
    /// context is a clean slate and no session work happens at all.
    pub async fn context(
        &self,
        user_key: Option<&str>,
        login_key: Option<&str>,
    ) -> SessionResult<SessionContext> {
        let session = match user_key {
            Some(user_key) => Some(self.get_session(user_key, login_key).await?),
            None => None,
        };

        let browser = self.engine().launch().await?;
        let options = ContextOptions {
            storage_state: session.as_ref().map(|s| s.storage_state.clone()),
        };
        let context = match browser.new_context(options).await {
            Ok(context) => context,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    warn!("Browser teardown failed: {}", close_err);
                }
                return Err(e.into());
            }
        };

        Ok(SessionContext {
            browser,
            context,
            session,
        })
    }

    /// Provision an authenticated context and open a page in it.
    pub async fn open(&self, user_key: &str, login_key: Option<&str>) -> SessionResult<OpenSession> {
        let context = self.context(Some(user_key), login_key).await?;
        let page = match context.context.new_page().await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close_err) = context.close().await {
                    warn!("Teardown after page failure also failed: {}", close_err);
                }
                return Err(e.into());
            }
        };
        Ok(OpenSession { page, context })
    }
}
