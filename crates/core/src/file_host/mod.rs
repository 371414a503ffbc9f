//! File-host integration.
//!
//! Quality redirects that do not end at a playable file land on a file host
//! page. The file id taken from that landing URL is exchanged for a direct
//! download link through the host's token API.

mod easyupload;

pub use easyupload::EasyUploadClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::fetcher::FetchError;

/// Errors that can occur when exchanging a file id.
#[derive(Debug, Error)]
pub enum FileHostError {
    /// The token request could not be sent.
    #[error("Token request failed: {0}")]
    Fetch(#[from] FetchError),

    /// The host answered with an error message.
    #[error("File host error: {0}")]
    Api(String),

    /// The host answered with something that is neither a link nor an error.
    #[error("Unexpected file host response: {0}")]
    UnexpectedFormat(String),
}

/// Exchanges file ids for direct download links.
#[async_trait]
pub trait FileHost: Send + Sync {
    /// Exchange `file_id` for a direct link. Single attempt.
    async fn exchange(&self, file_id: &str) -> Result<String, FileHostError>;
}

/// File id of a file-host landing URL: its last path segment.
///
/// Returns `None` when the segment is empty (e.g., a bare host URL).
pub fn file_id_from_url(url: &str) -> Option<String> {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    let path = match path.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
        None => path,
    };

    path.rsplit('/')
        .next()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
