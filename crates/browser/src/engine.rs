//! Engine traits
//!
//! Object-safe async traits over the automation backend. The session
//! core only needs launch, context creation with an optional seeded
//! storage state, page creation, and storage capture; interaction
//! methods on [`Page`] exist for login flows to drive the UI.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BrowserResult;
use crate::types::{StorageItem, StorageState};

/// Options for creating a new browser context
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    /// Initial cookies and origin storage for the context. `None`
    /// creates a clean-slate context.
    pub storage_state: Option<StorageState>,
}

/// Entry point into an automation backend
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Launch an isolated browser instance.
    async fn launch(&self) -> BrowserResult<Box<dyn Browser>>;
}

/// A running browser instance
#[async_trait]
pub trait Browser: Send + Sync {
    /// Create a new context, optionally seeded with a storage state.
    async fn new_context(&self, options: ContextOptions) -> BrowserResult<Box<dyn BrowserContext>>;

    /// Tear down the instance and every context derived from it.
    async fn close(&self) -> BrowserResult<()>;
}

/// An isolated cookie/storage scope within a browser
#[async_trait]
pub trait BrowserContext: Send + Sync {
    /// Open a new page in this context.
    async fn new_page(&self) -> BrowserResult<Arc<dyn Page>>;

    /// Pages currently open in this context, in creation order.
    async fn pages(&self) -> Vec<Arc<dyn Page>>;

    /// Snapshot cookies and origin-scoped localStorage.
    async fn storage_state(&self) -> BrowserResult<StorageState>;

    /// Close this context; its pages become invalid.
    async fn close(&self) -> BrowserResult<()>;
}

/// A single page handle
#[async_trait]
pub trait Page: Send + Sync {
    /// Current page URL; `about:blank` for a fresh page.
    async fn url(&self) -> BrowserResult<String>;

    async fn goto(&self, url: &str) -> BrowserResult<()>;

    async fn click(&self, selector: &str) -> BrowserResult<()>;

    async fn fill(&self, selector: &str, value: &str) -> BrowserResult<()>;

    /// Dump the page's sessionStorage entries.
    async fn session_storage(&self) -> BrowserResult<Vec<StorageItem>>;

    /// Dump the page's localStorage entries.
    async fn local_storage(&self) -> BrowserResult<Vec<StorageItem>>;
}
