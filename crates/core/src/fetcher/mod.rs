//! Network access for the resolution pipeline.
//!
//! Every page, redirect probe and API call goes through a [`Fetcher`], so the
//! pipeline can be driven by the real HTTP client or by a scripted mock.

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned once a fetch has exhausted its attempts.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Connection-level failure outside of reqwest.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A page request landed on the file host instead of returning HTML.
    #[error("Unexpected redirect to file host: {0}")]
    UnexpectedFileHost(String),
}

/// Result of a GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// Response body of a regular page.
    Body(String),
    /// Final URL after redirects, which points at the file host.
    FileHost(String),
}

impl Fetched {
    /// Body of a regular page; landing on the file host is an error here.
    pub fn into_body(self) -> Result<String, FetchError> {
        match self {
            Fetched::Body(body) => Ok(body),
            Fetched::FileHost(url) => Err(FetchError::UnexpectedFileHost(url)),
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET with retries, following redirects.
    ///
    /// Returns [`Fetched::FileHost`] instead of the body when the final URL
    /// is on the file host.
    async fn get(&self, url: &str) -> Result<Fetched, FetchError>;

    /// HEAD with retries; returns the final URL after redirects.
    async fn head(&self, url: &str) -> Result<String, FetchError>;

    /// Single-attempt form POST; returns the body whatever the status.
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<String, FetchError>;

    /// GET a page that must be HTML.
    async fn get_page(&self, url: &str) -> Result<String, FetchError> {
        self.get(url).await?.into_body()
    }
}
