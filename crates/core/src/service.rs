//! Add-on façade over the resolution pipeline.
//!
//! [`AddonService`] wires the fetcher, page reader, cache and file host into
//! the catalog directory, walker, locator and resolver, and exposes the four
//! operations the HTTP layer serves. None of them fail: problems are logged
//! and answered with empty results.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, LookupCache};
use crate::catalog::{CatalogDirectory, CatalogRef, ItemRecord, StreamCandidate};
use crate::config::Config;
use crate::fetcher::{FetchError, Fetcher, HttpFetcher};
use crate::file_host::{EasyUploadClient, FileHost};
use crate::locator::ItemLocator;
use crate::page::{PageReader, PageReaderError, SitePageReader};
use crate::resolver::StreamResolver;
use crate::text::TitleQuery;
use crate::walker::{ListingWalker, WalkerOptions};

/// Errors building the service from configuration.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to build HTTP client: {0}")]
    Fetcher(#[from] FetchError),

    #[error(transparent)]
    PageReader(#[from] PageReaderError),
}

pub struct AddonService {
    config: Config,
    cache: Arc<LookupCache>,
    catalogs: Arc<CatalogDirectory>,
    walker: ListingWalker,
    resolver: StreamResolver,
}

impl AddonService {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        reader: Arc<dyn PageReader>,
        file_host: Arc<dyn FileHost>,
        cache: Arc<LookupCache>,
    ) -> Self {
        let catalogs = Arc::new(CatalogDirectory::new(
            Arc::clone(&fetcher),
            Arc::clone(&reader),
            &config.site.base_url,
            &config.addon.catalog_prefix,
        ));
        let walker = ListingWalker::new(
            Arc::clone(&fetcher),
            Arc::clone(&reader),
            Arc::clone(&cache),
            WalkerOptions::from_config(&config),
        );
        let locator = Arc::new(ItemLocator::new(
            Arc::clone(&fetcher),
            Arc::clone(&reader),
            Arc::clone(&cache),
            Arc::clone(&catalogs),
            config.walker.max_pages,
        ));
        let resolver = StreamResolver::new(
            fetcher,
            reader,
            locator,
            file_host,
            &config.site.base_url,
            config.file_host.direct_media_markers.clone(),
        );

        Self {
            config,
            cache,
            catalogs,
            walker,
            resolver,
        }
    }

    /// Build the production service: reqwest fetcher, selector-based reader
    /// and the easyupload token client.
    pub fn from_config(config: Config) -> Result<Self, ServiceError> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(
            config.fetcher.clone(),
            &config.site.user_agent,
            &config.file_host.domain_marker,
        )?);
        let reader: Arc<dyn PageReader> = Arc::new(SitePageReader::new(&config.site.selectors)?);
        let file_host: Arc<dyn FileHost> = Arc::new(EasyUploadClient::new(
            Arc::clone(&fetcher),
            config.file_host.clone(),
        ));

        Ok(Self::new(
            config,
            fetcher,
            reader,
            file_host,
            Arc::new(LookupCache::new()),
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover catalogs once at startup.
    pub async fn initialize(&self) -> Vec<CatalogRef> {
        let catalogs = self.catalogs.refresh().await;
        info!(count = catalogs.len(), "Add-on initialized");
        catalogs
    }

    /// Catalogs known from the last discovery.
    pub async fn list_catalogs(&self) -> Vec<CatalogRef> {
        self.catalogs.known().await
    }

    /// Items of a catalog, optionally filtered by a title search.
    ///
    /// Catalogs are rediscovered on every call so ids follow the site's
    /// current category order; a failed discovery keeps the previous list.
    pub async fn list_items(&self, catalog_id: &str, search: Option<&str>) -> Vec<ItemRecord> {
        let catalogs = self.catalogs.refresh().await;
        let Some(catalog) = catalogs.into_iter().find(|c| c.id == catalog_id) else {
            debug!(catalog_id, "Unknown catalog");
            return Vec::new();
        };

        let query = search.and_then(TitleQuery::new);
        let walked = match &query {
            Some(query) => {
                self.walker
                    .walk(&catalog.listing_url, |s| query.matches(&s.title))
                    .await
            }
            None => self.walker.walk_all(&catalog.listing_url).await,
        };

        let summaries = match walked {
            Ok(summaries) => summaries,
            Err(e) => {
                warn!(catalog_id, error = %e, "Listing walk failed");
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            let record = match self.cache.record(&summary.id).await {
                Some(record) => record,
                None => ItemRecord::from_summary(summary, &self.config.records),
            };
            records.push(record);
        }
        records
    }

    /// Display record for an item.
    ///
    /// Falls back to re-walking the listing the item was last seen on.
    pub async fn get_item_meta(&self, item_id: &str) -> Option<ItemRecord> {
        if let Some(record) = self.cache.record(item_id).await {
            return Some(record);
        }

        let listing_url = self.cache.listing_url(item_id).await?;
        if let Err(e) = self.walker.walk_all(&listing_url).await {
            warn!(item_id, error = %e, "Re-walk for item meta failed");
            return None;
        }
        self.cache.record(item_id).await
    }

    /// Playable streams for an item.
    pub async fn get_streams(&self, item_id: &str) -> Vec<StreamCandidate> {
        self.resolver.resolve(item_id).await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}
