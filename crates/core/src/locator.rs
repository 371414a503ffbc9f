//! Finding which listing page holds an item.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::LookupCache;
use crate::catalog::CatalogDirectory;
use crate::fetcher::{FetchError, Fetcher};
use crate::page::PageReader;
use crate::walker::ListingPages;

/// Result of a location attempt. Not finding an item is an ordinary outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    /// Listing page holding the item.
    Found(String),
    NotFound,
}

impl LocateOutcome {
    pub fn page_url(&self) -> Option<&str> {
        match self {
            LocateOutcome::Found(url) => Some(url),
            LocateOutcome::NotFound => None,
        }
    }
}

/// An item's listing page together with its detail href on that page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLink {
    pub page_url: String,
    pub href: String,
}

pub struct ItemLocator {
    fetcher: Arc<dyn Fetcher>,
    reader: Arc<dyn PageReader>,
    cache: Arc<LookupCache>,
    catalogs: Arc<CatalogDirectory>,
    max_pages: u32,
}

impl ItemLocator {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        reader: Arc<dyn PageReader>,
        cache: Arc<LookupCache>,
        catalogs: Arc<CatalogDirectory>,
        max_pages: u32,
    ) -> Self {
        Self {
            fetcher,
            reader,
            cache,
            catalogs,
            max_pages,
        }
    }

    /// Page of `catalog_url` holding `item_id`.
    ///
    /// A cached location is returned without fetching. Otherwise the listing
    /// is searched and a hit is cached.
    pub async fn locate(&self, catalog_url: &str, item_id: &str) -> Result<LocateOutcome, FetchError> {
        if let Some(url) = self.cache.listing_url(item_id).await {
            debug!(item_id, url = %url, "Location cache hit");
            return Ok(LocateOutcome::Found(url));
        }

        match self.find_link(catalog_url, item_id).await? {
            Some(link) => {
                self.cache.set_listing_url(item_id, &link.page_url).await;
                Ok(LocateOutcome::Found(link.page_url))
            }
            None => Ok(LocateOutcome::NotFound),
        }
    }

    /// Locate `item_id` in any known catalog, in catalog order.
    ///
    /// A catalog that fails to load is logged and skipped.
    pub async fn locate_anywhere(&self, item_id: &str) -> LocateOutcome {
        if let Some(url) = self.cache.listing_url(item_id).await {
            debug!(item_id, url = %url, "Location cache hit");
            return LocateOutcome::Found(url);
        }

        let mut catalogs = self.catalogs.known().await;
        if catalogs.is_empty() {
            catalogs = self.catalogs.refresh().await;
        }

        for catalog in &catalogs {
            match self.locate(&catalog.listing_url, item_id).await {
                Ok(LocateOutcome::Found(url)) => {
                    info!(item_id, catalog = %catalog.id, url = %url, "Item located");
                    return LocateOutcome::Found(url);
                }
                Ok(LocateOutcome::NotFound) => {}
                Err(e) => {
                    warn!(item_id, catalog = %catalog.id, error = %e, "Catalog search failed");
                }
            }
        }

        info!(item_id, catalogs = catalogs.len(), "Item not found in any catalog");
        LocateOutcome::NotFound
    }

    /// Search pages from `start_url` for the item's detail link, stopping at
    /// the first page that has it. Nothing is cached.
    pub async fn find_link(&self, start_url: &str, item_id: &str) -> Result<Option<ItemLink>, FetchError> {
        let pages = ListingPages::new(start_url, self.max_pages);

        for page_url in pages.urls() {
            debug!(item_id, url = %page_url, "Searching listing page");
            let html = self.fetcher.get_page(&page_url).await?;

            if let Some(href) = self.reader.find_item_link(&html, item_id) {
                return Ok(Some(ItemLink { page_url, href }));
            }
            if self.reader.find_next_page_link(&html).is_none() {
                break;
            }
        }

        Ok(None)
    }
}
