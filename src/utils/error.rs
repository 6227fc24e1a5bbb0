//! Error types for the refont engine
//!
//! Only genuinely external failures surface here: settings reads and
//! stylesheet fetches. Everything the scan can recover from locally
//! (denied rule access, unreadable computed styles) is handled in place
//! and never reaches the caller as an error.

use thiserror::Error;

/// Main error type for engine operations
#[derive(Debug, Error)]
pub enum RefontError {
    /// Persisted settings could not be read; treated as "feature off"
    #[error("settings read failed: {0}")]
    Settings(String),

    /// A stylesheet fetch returned a non-success status
    #[error("http status {status} fetching {url}")]
    Http { status: u16, url: String },

    /// Transport-level fetch failure
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// A stylesheet href was not a valid URL
    #[error("invalid stylesheet url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Convenience Result type for engine operations
pub type Result<T> = std::result::Result<T, RefontError>;
