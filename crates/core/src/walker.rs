//! Paginated listing walks.
//!
//! A catalog listing spans numbered pages (`.../<n>.html`). The walker
//! fetches them in order, turns well-formed entries into [`ItemSummary`]s and
//! records every entry it sees in the [`LookupCache`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tracing::{debug, info};

use crate::cache::LookupCache;
use crate::catalog::{ItemRecord, ItemSummary};
use crate::config::{Config, RecordDefaults};
use crate::fetcher::{FetchError, Fetcher};
use crate::page::{item_id_from_href, ListingEntry, PageReader};
use crate::text::normalize_poster_url;

static PAGE_NUMBER_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d+)\.html$").unwrap());

/// Numbered page URLs of one listing, capped at `max_pages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPages {
    prefix: String,
    first: u32,
    max_pages: u32,
}

impl ListingPages {
    /// Pages of the listing at `listing_url`.
    ///
    /// A `/<n>.html` suffix is stripped and counting starts at `n`; URLs
    /// without it start at page 1.
    pub fn new(listing_url: &str, max_pages: u32) -> Self {
        let (prefix, first) = match PAGE_NUMBER_SUFFIX.captures(listing_url) {
            Some(caps) => {
                let start = caps.get(0).map(|m| m.start()).unwrap_or(listing_url.len());
                let first = caps[1].parse().unwrap_or(1);
                (listing_url[..start].to_string(), first)
            }
            None => (listing_url.trim_end_matches('/').to_string(), 1),
        };

        Self {
            prefix,
            first,
            max_pages,
        }
    }

    /// URL of page number `n`.
    pub fn page_url(&self, n: u32) -> String {
        format!("{}/{}.html", self.prefix, n)
    }

    /// Page URLs in visiting order, at most `max_pages` of them. Numbering
    /// stops at `u32::MAX`.
    pub fn urls(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.max_pages)
            .map_while(move |offset| self.first.checked_add(offset))
            .map(move |n| self.page_url(n))
    }
}

/// Per-walk settings.
#[derive(Debug, Clone)]
pub struct WalkerOptions {
    /// Hard cap on pages visited per walk.
    pub max_pages: u32,
    /// Poster size variant to request.
    pub poster_variant: u32,
    /// Fields stamped on every record written to the cache.
    pub record_defaults: RecordDefaults,
}

impl WalkerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pages: config.walker.max_pages,
            poster_variant: config.site.poster_variant,
            record_defaults: config.records.clone(),
        }
    }
}

impl Default for WalkerOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Walks listing pages and extracts item summaries.
pub struct ListingWalker {
    fetcher: Arc<dyn Fetcher>,
    reader: Arc<dyn PageReader>,
    cache: Arc<LookupCache>,
    options: WalkerOptions,
}

impl ListingWalker {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        reader: Arc<dyn PageReader>,
        cache: Arc<LookupCache>,
        options: WalkerOptions,
    ) -> Self {
        Self {
            fetcher,
            reader,
            cache,
            options,
        }
    }

    pub fn options(&self) -> &WalkerOptions {
        &self.options
    }

    /// Walk the listing starting at `listing_url`, returning the summaries
    /// accepted by `filter` in page order.
    ///
    /// The filter never shortens the walk: every page up to the cap is
    /// visited and every well-formed entry lands in the cache. A failed page
    /// fetch aborts the walk.
    pub async fn walk<F>(&self, listing_url: &str, filter: F) -> Result<Vec<ItemSummary>, FetchError>
    where
        F: Fn(&ItemSummary) -> bool + Send + Sync,
    {
        let pages = ListingPages::new(listing_url, self.options.max_pages);
        let mut accepted = Vec::new();
        let mut visited = 0u32;

        for page_url in pages.urls() {
            visited += 1;
            debug!(url = %page_url, page = visited, "Fetching listing page");
            let html = self.fetcher.get_page(&page_url).await?;

            for summary in self
                .reader
                .find_listing_entries(&html)
                .into_iter()
                .filter_map(|entry| self.summarize(entry))
            {
                let record = ItemRecord::from_summary(&summary, &self.options.record_defaults);
                self.cache.set_record(record).await;
                self.cache.set_listing_url(&summary.id, listing_url).await;

                if filter(&summary) {
                    accepted.push(summary);
                }
            }

            if self.reader.find_next_page_link(&html).is_none() {
                break;
            }
        }

        info!(
            url = listing_url,
            pages = visited,
            items = accepted.len(),
            "Listing walk complete"
        );
        Ok(accepted)
    }

    /// Walk without filtering.
    pub async fn walk_all(&self, listing_url: &str) -> Result<Vec<ItemSummary>, FetchError> {
        self.walk(listing_url, |_| true).await
    }

    fn summarize(&self, entry: ListingEntry) -> Option<ItemSummary> {
        let (Some(title), Some(href), Some(poster)) = (entry.title, entry.href, entry.poster) else {
            debug!("Skipping incomplete listing entry");
            return None;
        };
        let id = item_id_from_href(&href)?;

        Some(ItemSummary {
            id,
            title,
            poster_url: normalize_poster_url(&poster, self.options.poster_variant),
        })
    }
}
