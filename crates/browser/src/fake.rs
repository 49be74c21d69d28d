//! In-memory fake engine
//!
//! A scripted backend for tests of engine consumers. Every launched
//! browser shares the engine's canned storage state and storage dumps;
//! launches, closes, and page interactions are recorded so tests can
//! assert on engine usage (or on its absence).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::engine::{Browser, BrowserContext, BrowserEngine, ContextOptions, Page};
use crate::error::{BrowserError, BrowserResult};
use crate::types::{StorageItem, StorageState};

#[derive(Default)]
struct Inner {
    storage_state: StorageState,
    session_items: Vec<StorageItem>,
    local_items: Vec<StorageItem>,
    fail_launch: Option<String>,
    launches: AtomicUsize,
    closes: AtomicUsize,
    actions: Mutex<Vec<String>>,
}

/// Scripted in-memory [`BrowserEngine`]
#[derive(Clone, Default)]
pub struct FakeEngine {
    inner: Arc<Inner>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage state every context snapshot will report (unless the
    /// context was seeded via [`ContextOptions::storage_state`]).
    pub fn with_storage_state(state: StorageState) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage_state: state,
                ..Inner::default()
            }),
        }
    }

    /// Engine whose `launch` always fails. Used to prove a code path
    /// never touches the browser.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                fail_launch: Some(reason.into()),
                ..Inner::default()
            }),
        }
    }

    /// Entries reported by every page's sessionStorage dump.
    pub fn set_session_items(&mut self, items: Vec<StorageItem>) {
        self.inner_mut().session_items = items;
    }

    /// Entries reported by every page's localStorage dump.
    pub fn set_local_items(&mut self, items: Vec<StorageItem>) {
        self.inner_mut().local_items = items;
    }

    /// Number of successful `launch` calls so far.
    pub fn launches(&self) -> usize {
        self.inner.launches.load(Ordering::SeqCst)
    }

    /// Number of `Browser::close` calls so far.
    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    /// Recorded page interactions (`goto`, `click`, `fill`), oldest first.
    pub fn actions(&self) -> Vec<String> {
        self.inner.actions.lock().unwrap().clone()
    }

    fn inner_mut(&mut self) -> &mut Inner {
        // Only valid before the engine is shared with a manager.
        Arc::get_mut(&mut self.inner).expect("FakeEngine already shared")
    }

    fn record(&self, action: String) {
        self.inner.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl BrowserEngine for FakeEngine {
    async fn launch(&self) -> BrowserResult<Box<dyn Browser>> {
        if let Some(reason) = &self.inner.fail_launch {
            return Err(BrowserError::Launch(reason.clone()));
        }
        self.inner.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeBrowser {
            engine: self.clone(),
        }))
    }
}

struct FakeBrowser {
    engine: FakeEngine,
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn new_context(&self, options: ContextOptions) -> BrowserResult<Box<dyn BrowserContext>> {
        Ok(Box::new(FakeContext {
            engine: self.engine.clone(),
            seeded: options.storage_state,
            pages: Mutex::new(Vec::new()),
        }))
    }

    async fn close(&self) -> BrowserResult<()> {
        self.engine.inner.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeContext {
    engine: FakeEngine,
    seeded: Option<StorageState>,
    pages: Mutex<Vec<Arc<dyn Page>>>,
}

#[async_trait]
impl BrowserContext for FakeContext {
    async fn new_page(&self) -> BrowserResult<Arc<dyn Page>> {
        let page: Arc<dyn Page> = Arc::new(FakePage {
            engine: self.engine.clone(),
            url: Mutex::new("about:blank".to_string()),
        });
        self.pages.lock().unwrap().push(page.clone());
        Ok(page)
    }

    async fn pages(&self) -> Vec<Arc<dyn Page>> {
        self.pages.lock().unwrap().clone()
    }

    async fn storage_state(&self) -> BrowserResult<StorageState> {
        // A seeded context reports its seed back; otherwise the canned
        // post-login state.
        Ok(self
            .seeded
            .clone()
            .unwrap_or_else(|| self.engine.inner.storage_state.clone()))
    }

    async fn close(&self) -> BrowserResult<()> {
        Ok(())
    }
}

struct FakePage {
    engine: FakeEngine,
    url: Mutex<String>,
}

#[async_trait]
impl Page for FakePage {
    async fn url(&self) -> BrowserResult<String> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn goto(&self, url: &str) -> BrowserResult<()> {
        self.engine.record(format!("goto {url}"));
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        self.engine.record(format!("click {selector}"));
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> BrowserResult<()> {
        self.engine.record(format!("fill {selector}={value}"));
        Ok(())
    }

    async fn session_storage(&self) -> BrowserResult<Vec<StorageItem>> {
        Ok(self.engine.inner.session_items.clone())
    }

    async fn local_storage(&self) -> BrowserResult<Vec<StorageItem>> {
        Ok(self.engine.inner.local_items.clone())
    }
}
