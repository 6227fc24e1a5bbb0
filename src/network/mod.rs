//! Stylesheet fetching
//!
//! Cross-origin stylesheets deny script access to their rules, so the
//! scanner re-fetches their text and parses it directly. The [`Fetch`]
//! seam keeps the scanner testable without a network.

use std::collections::HashMap;
use std::future::Future;

use url::Url;

use crate::utils::{RefontError, Result};

/// Narrow seam over `GET <stylesheet-url>`.
pub trait Fetch: Send + Sync {
    /// Fetch the text body at `url`; any non-2xx status is an error.
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP fetcher backed by reqwest
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh connection pool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Fetch for HttpFetcher {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send {
        async move {
            let url = Url::parse(url)?;
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(RefontError::Http {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(response.text().await?)
        }
    }
}

/// Fixture fetcher serving stylesheet text from memory; used by tests and
/// the demo binary.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    sheets: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the CSS text served for `url`.
    pub fn insert(&mut self, url: impl Into<String>, css: impl Into<String>) {
        self.sheets.insert(url.into(), css.into());
    }
}

impl Fetch for StaticFetcher {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send {
        let result = self.sheets.get(url).cloned().ok_or_else(|| RefontError::Http {
            status: 404,
            url: url.to_string(),
        });
        async move { result }
    }
}
