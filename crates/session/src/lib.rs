//! Cross-worker session cache for browser E2E suites
//!
//! Parallel test workers are separate OS processes that all want a small
//! set of pre-authenticated browser sessions. Logging in is expensive
//! (a browser launch plus UI or API steps), so each logical session is
//! created at most once per run and shared through the filesystem:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  SessionManager::get_session(user_key, login_key)            │
//! │    1. read sessions/<cacheKey>.session.json  → hit? done     │
//! │    2. create sessions/<cacheKey>.lock (O_EXCL)               │
//! │       acquired → run login flow, persist, release lock       │
//! │       contended → poll until the record appears or timeout   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock file's atomic create-exclusive semantics are the only
//! cross-process coordination mechanism; no central coordinator process
//! exists. Workers that lose the race never launch a browser; they
//! only read and wait.
//!
//! Login procedures are pluggable: a [`login::LoginFlow`] drives a
//! fresh page into an authenticated state and may stash out-of-band
//! values (bearer tokens and the like) in the session's `meta` map.
//! [`SessionManager::context`] then provisions ready-to-use browser
//! contexts seeded with the cached storage state.

pub mod config;
pub mod creds;
pub mod error;
pub mod login;
pub mod manager;
pub mod provision;
pub mod record;
pub mod store;

pub use config::StoreConfig;
pub use creds::{resolve_creds, Credentials};
pub use error::{SessionError, SessionResult};
pub use login::{LoginContext, LoginFlow, LoginFlowConfig, MetaEntry, MetaSink};
pub use manager::{SessionManager, DEFAULT_LOGIN_KEY};
pub use provision::{OpenSession, SessionContext};
pub use record::{cache_key, SessionRecord};
pub use store::{FileSessionStore, SessionStore};
