//! Error types for the browser engine interface

use thiserror::Error;

/// Result type alias for engine operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// Errors surfaced by a browser automation backend
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("selector '{selector}' failed: {reason}")]
    Selector { selector: String, reason: String },

    #[error("browser context is closed")]
    ContextClosed,

    #[error("page is closed")]
    PageClosed,

    #[error("engine protocol error: {0}")]
    Protocol(String),

    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
