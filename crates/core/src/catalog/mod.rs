//! Catalog discovery.
//!
//! The site exposes its catalogs on a category page linked from the home
//! page. The [`CatalogDirectory`] discovers them in two hops and keeps the
//! last good list around for when the site misbehaves.

mod types;

pub use types::*;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::fetcher::{FetchError, Fetcher};
use crate::page::{absolute_url, PageReader};
use crate::text::normalize_text;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to fetch catalog page: {0}")]
    Fetch(#[from] FetchError),

    #[error("Home page has no category link")]
    MissingCategoryLink,
}

/// Known catalogs of the site.
pub struct CatalogDirectory {
    fetcher: Arc<dyn Fetcher>,
    reader: Arc<dyn PageReader>,
    base_url: String,
    catalog_prefix: String,
    catalogs: RwLock<Vec<CatalogRef>>,
}

impl CatalogDirectory {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        reader: Arc<dyn PageReader>,
        base_url: &str,
        catalog_prefix: &str,
    ) -> Self {
        Self {
            fetcher,
            reader,
            base_url: base_url.trim_end_matches('/').to_string(),
            catalog_prefix: catalog_prefix.to_string(),
            catalogs: RwLock::new(Vec::new()),
        }
    }

    /// Fetch the home page, follow its category link and read the catalogs.
    ///
    /// Ids are `<prefix>-<index>`, counting every catalog entry on the page
    /// including those skipped for lacking a name or link.
    pub async fn discover(&self) -> Result<Vec<CatalogRef>, CatalogError> {
        let home = self.fetcher.get_page(&self.base_url).await?;
        let category_href = self
            .reader
            .find_category_link(&home)
            .ok_or(CatalogError::MissingCategoryLink)?;

        let category_url = absolute_url(&self.base_url, &category_href);
        let page = self.fetcher.get_page(&category_url).await?;

        let catalogs = self
            .reader
            .find_catalog_entries(&page)
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let name = entry.name.trim();
                let href = entry.href?;
                if name.is_empty() {
                    return None;
                }
                Some(CatalogRef {
                    id: format!("{}-{}", self.catalog_prefix, index),
                    name: normalize_text(name),
                    listing_url: absolute_url(&self.base_url, &href),
                })
            })
            .collect();

        Ok(catalogs)
    }

    /// Rediscover catalogs, keeping the previous list when discovery fails.
    pub async fn refresh(&self) -> Vec<CatalogRef> {
        match self.discover().await {
            Ok(catalogs) => {
                info!(count = catalogs.len(), "Catalogs discovered");
                *self.catalogs.write().await = catalogs.clone();
                catalogs
            }
            Err(e) => {
                warn!(error = %e, "Catalog discovery failed, keeping previous list");
                self.known().await
            }
        }
    }

    /// Catalogs from the last successful discovery.
    pub async fn known(&self) -> Vec<CatalogRef> {
        self.catalogs.read().await.clone()
    }

    /// Known catalog with the given id.
    pub async fn find(&self, catalog_id: &str) -> Option<CatalogRef> {
        self.catalogs
            .read()
            .await
            .iter()
            .find(|c| c.id == catalog_id)
            .cloned()
    }
}
