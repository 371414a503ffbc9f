//! Resolving an item into playable stream URLs.
//!
//! Resolution walks a chain of hops: the item's listing page, its download
//! listing, one download page per quality, and that page's redirect. The
//! redirect either ends at a playable file or at the file host, whose token
//! API hands out the direct link.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::StreamCandidate;
use crate::fetcher::{FetchError, Fetched, Fetcher};
use crate::file_host::{file_id_from_url, FileHost, FileHostError};
use crate::locator::{ItemLocator, LocateOutcome};
use crate::page::{absolute_url, section_from_href, PageReader, QualityEntry};

/// Why an item or a single quality could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Item link missing from {0}")]
    ItemLinkMissing(String),

    #[error("Detail link has no section: {0}")]
    InvalidDetailLink(String),

    #[error("Download page has no redirect link: {0}")]
    MissingRedirectLink(String),

    #[error("Redirect did not reach the file host: {0}")]
    NotFileHost(String),

    #[error("No file id in file host URL: {0}")]
    MissingFileId(String),

    #[error(transparent)]
    FileHost(#[from] FileHostError),
}

pub struct StreamResolver {
    fetcher: Arc<dyn Fetcher>,
    reader: Arc<dyn PageReader>,
    locator: Arc<ItemLocator>,
    file_host: Arc<dyn FileHost>,
    base_url: String,
    direct_media_markers: Vec<String>,
}

impl StreamResolver {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        reader: Arc<dyn PageReader>,
        locator: Arc<ItemLocator>,
        file_host: Arc<dyn FileHost>,
        base_url: &str,
        direct_media_markers: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            reader,
            locator,
            file_host,
            base_url: base_url.trim_end_matches('/').to_string(),
            direct_media_markers,
        }
    }

    /// Playable candidates for `item_id`, in quality order.
    ///
    /// Never fails: problems are logged and shrink the result.
    pub async fn resolve(&self, item_id: &str) -> Vec<StreamCandidate> {
        match self.try_resolve(item_id).await {
            Ok(candidates) => {
                info!(item_id, count = candidates.len(), "Streams resolved");
                candidates
            }
            Err(e) => {
                warn!(item_id, error = %e, "Stream resolution failed");
                Vec::new()
            }
        }
    }

    async fn try_resolve(&self, item_id: &str) -> Result<Vec<StreamCandidate>, ResolveError> {
        let page_url = match self.locator.locate_anywhere(item_id).await {
            LocateOutcome::Found(url) => url,
            LocateOutcome::NotFound => return Ok(Vec::new()),
        };

        let link = self
            .locator
            .find_link(&page_url, item_id)
            .await?
            .ok_or_else(|| ResolveError::ItemLinkMissing(page_url.clone()))?;
        let section = section_from_href(&link.href)
            .ok_or_else(|| ResolveError::InvalidDetailLink(link.href.clone()))?;

        let listing_url = format!("{}/{}/fl/{}/1.html", self.base_url, section, item_id);
        debug!(item_id, url = %listing_url, "Fetching download listing");
        let listing = self.fetcher.get_page(&listing_url).await?;

        let mut candidates = Vec::new();
        for quality in self.reader.find_quality_entries(&listing) {
            let Some(href) = quality.href.as_deref() else {
                debug!(item_id, quality = %quality.label, "Quality entry without link");
                continue;
            };

            match self.resolve_quality(&quality, href).await {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => {
                    warn!(item_id, quality = %quality.label, error = %e, "Quality skipped");
                }
            }
        }

        Ok(candidates)
    }

    async fn resolve_quality(
        &self,
        quality: &QualityEntry,
        href: &str,
    ) -> Result<StreamCandidate, ResolveError> {
        let download_url = absolute_url(&self.base_url, href);
        let page = self.fetcher.get_page(&download_url).await?;
        let redirect_href = self
            .reader
            .find_redirect_link(&page)
            .ok_or_else(|| ResolveError::MissingRedirectLink(download_url.clone()))?;
        let redirect_url = absolute_url(&self.base_url, &redirect_href);

        let final_url = self.fetcher.head(&redirect_url).await?;
        if self.is_direct_media(&final_url) {
            debug!(quality = %quality.label, url = %final_url, "Direct file link");
            return Ok(StreamCandidate {
                quality_label: quality.label.clone(),
                resolved_url: final_url,
            });
        }

        let landing_url = match self.fetcher.get(&redirect_url).await? {
            Fetched::FileHost(url) => url,
            Fetched::Body(_) => return Err(ResolveError::NotFileHost(redirect_url)),
        };
        let file_id = file_id_from_url(&landing_url)
            .ok_or_else(|| ResolveError::MissingFileId(landing_url.clone()))?;

        debug!(quality = %quality.label, file_id = %file_id, "Exchanging file id");
        let resolved_url = self.file_host.exchange(&file_id).await?;

        Ok(StreamCandidate {
            quality_label: quality.label.clone(),
            resolved_url,
        })
    }

    fn is_direct_media(&self, url: &str) -> bool {
        self.direct_media_markers
            .iter()
            .any(|marker| url.contains(marker.as_str()))
    }
}
