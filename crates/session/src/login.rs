//! Login flow executor
//!
//! Runs a caller-supplied authentication procedure against a fresh
//! browser context and packages the outcome as a [`SessionRecord`].
//! The executor never persists the record (the coordinator does) and
//! never retries: a failed flow propagates after browser teardown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use harness_browser::{
    Browser, BrowserContext, BrowserEngine, ContextOptions, Page, StorageDump,
};
use tracing::{debug, warn};
use url::{Origin, Url};

use crate::creds::resolve_creds;
use crate::error::{SessionError, SessionResult};
use crate::record::SessionRecord;

/// One meta contribution from a login flow: a single pair or a bulk
/// map. Both merge into the same map, last write per key wins.
#[derive(Debug, Clone)]
pub enum MetaEntry {
    Single { key: String, value: String },
    Bulk(HashMap<String, String>),
}

/// Collector login flows write session meta into (bearer tokens, ids,
/// anything the consuming test needs out-of-band).
#[derive(Debug, Default)]
pub struct MetaSink {
    entries: Mutex<HashMap<String, String>>,
}

impl MetaSink {
    pub fn save(&self, entry: MetaEntry) {
        let mut entries = self.entries.lock().unwrap();
        match entry {
            MetaEntry::Single { key, value } => {
                entries.insert(key, value);
            }
            MetaEntry::Bulk(map) => entries.extend(map),
        }
    }

    /// Save a single key/value pair.
    pub fn save_pair(&self, key: impl Into<String>, value: impl Into<String>) {
        self.save(MetaEntry::Single {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Save many values at once.
    pub fn save_all(&self, map: HashMap<String, String>) {
        self.save(MetaEntry::Bulk(map));
    }

    fn into_map(self) -> HashMap<String, String> {
        self.entries.into_inner().unwrap()
    }
}

/// Everything a login flow gets to work with
pub struct LoginContext<'a> {
    /// Fresh page in a clean-slate context
    pub page: Arc<dyn Page>,
    /// User the session is being created for
    pub user_key: &'a str,
    /// Sink for out-of-band session meta
    pub meta: &'a MetaSink,
}

/// A pluggable authentication procedure.
///
/// The flow may drive the UI through `ctx.page` or authenticate over
/// the network directly; it only has to leave the context in an
/// authenticated state before returning. Flow errors are surfaced to
/// the caller unretried.
#[async_trait]
pub trait LoginFlow: Send + Sync {
    async fn run(&self, ctx: LoginContext<'_>) -> anyhow::Result<()>;
}

/// A login procedure plus persistence flags.
///
/// Configs are injected explicitly: the coordinator receives them at
/// construction rather than resolving modules by naming convention.
#[derive(Clone)]
pub struct LoginFlowConfig {
    /// Keep cookies in the persisted storage state (default true).
    /// When false the cookie list is cleared before persisting; the
    /// rest of the snapshot is retained.
    pub save_cookies: bool,
    /// Capture localStorage from the first page (default true)
    pub save_local_storage: bool,
    /// Capture sessionStorage from the first page (default true)
    pub save_session_storage: bool,
    /// The authentication procedure itself
    pub flow: Arc<dyn LoginFlow>,
}

impl LoginFlowConfig {
    pub fn new(flow: Arc<dyn LoginFlow>) -> Self {
        Self {
            save_cookies: true,
            save_local_storage: true,
            save_session_storage: true,
            flow,
        }
    }

    pub fn with_save_cookies(mut self, save: bool) -> Self {
        self.save_cookies = save;
        self
    }

    pub fn with_save_local_storage(mut self, save: bool) -> Self {
        self.save_local_storage = save;
        self
    }

    pub fn with_save_session_storage(mut self, save: bool) -> Self {
        self.save_session_storage = save;
        self
    }
}

/// Run `config.flow` for `user_key` and assemble the session record.
///
/// Credentials are validated before any browser resource is touched,
/// so a misconfigured environment fails without a wasted launch. The
/// browser is torn down on every exit path; a teardown failure is
/// logged but never masks the flow's own result.
pub(crate) async fn create_session(
    engine: &dyn BrowserEngine,
    user_key: &str,
    config: &LoginFlowConfig,
) -> SessionResult<SessionRecord> {
    resolve_creds(user_key)?;

    let browser = engine.launch().await?;
    let result = run_flow(browser.as_ref(), user_key, config).await;
    if let Err(e) = browser.close().await {
        warn!("Browser teardown failed for '{}': {}", user_key, e);
    }
    result
}

async fn run_flow(
    browser: &dyn Browser,
    user_key: &str,
    config: &LoginFlowConfig,
) -> SessionResult<SessionRecord> {
    // Clean slate: no storage reuse for the login context.
    let context = browser.new_context(ContextOptions::default()).await?;
    let page = context.new_page().await?;

    let meta = MetaSink::default();
    config
        .flow
        .run(LoginContext {
            page,
            user_key,
            meta: &meta,
        })
        .await
        .map_err(|source| SessionError::LoginFlow {
            user_key: user_key.to_string(),
            source,
        })?;

    let mut storage_state = context.storage_state().await?;
    if !config.save_cookies {
        storage_state.cookies.clear();
    }

    let session_storage = if config.save_session_storage {
        dump_first_page(context.as_ref(), StorageKind::Session).await
    } else {
        vec![]
    };
    let local_storage = if config.save_local_storage {
        dump_first_page(context.as_ref(), StorageKind::Local).await
    } else {
        vec![]
    };

    if let Err(e) = context.close().await {
        warn!("Context close failed for '{}': {}", user_key, e);
    }

    debug!(
        "Login flow for '{}' captured {} cookie(s), {} meta value(s)",
        user_key,
        storage_state.cookies.len(),
        meta.entries.lock().unwrap().len()
    );

    Ok(SessionRecord {
        user_key: user_key.to_string(),
        storage_state,
        meta: meta.into_map(),
        session_storage,
        local_storage,
    })
}

enum StorageKind {
    Session,
    Local,
}

/// Dump sessionStorage/localStorage from the first open page of the
/// context. No open page, a blank page, or an unreadable origin all
/// yield an empty capture, not an error.
async fn dump_first_page(context: &dyn BrowserContext, kind: StorageKind) -> Vec<StorageDump> {
    let Some(page) = context.pages().await.into_iter().next() else {
        return vec![];
    };
    let Ok(url) = page.url().await else {
        return vec![];
    };
    let Some(origin) = page_origin(&url) else {
        return vec![];
    };

    let items = match kind {
        StorageKind::Session => page.session_storage().await,
        StorageKind::Local => page.local_storage().await,
    };
    match items {
        Ok(items) => vec![StorageDump { origin, items }],
        Err(_) => vec![],
    }
}

/// Origin of a navigated page URL; `None` for blank or opaque origins.
fn page_origin(url: &str) -> Option<String> {
    if url.is_empty() || url == "about:blank" {
        return None;
    }
    match Url::parse(url).ok()?.origin() {
        origin @ Origin::Tuple(..) => Some(origin.ascii_serialization()),
        Origin::Opaque(_) => None,
    }
}
