//! Browser automation engine interface
//!
//! The session cache core never talks to a concrete automation backend
//! directly. It sees the engine through the traits in this crate:
//!
//! ```text
//! BrowserEngine::launch() -> Browser
//!   Browser::new_context(options) -> BrowserContext
//!     BrowserContext::new_page() -> Page
//!     BrowserContext::storage_state() -> StorageState
//! ```
//!
//! Contexts and pages are handles into the engine process; closing the
//! browser invalidates every handle derived from it.
//!
//! The `fake` feature adds an in-memory `fake::FakeEngine` with canned
//! storage state and launch/close counters, for tests of engine consumers.

pub mod engine;
pub mod error;
pub mod types;

#[cfg(feature = "fake")]
pub mod fake;

pub use engine::{Browser, BrowserContext, BrowserEngine, ContextOptions, Page};
pub use error::{BrowserError, BrowserResult};
pub use types::{Cookie, OriginState, StorageDump, StorageItem, StorageState};
