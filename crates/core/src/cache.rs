//! Process-lifetime lookup cache for item locations and records.
//!
//! Entries are snapshots: writes overwrite, nothing is evicted, and a miss
//! only means the caller has to scrape again.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::catalog::ItemRecord;

/// Shared `item id → listing page` and `item id → record` maps.
#[derive(Debug, Default)]
pub struct LookupCache {
    listing_urls: RwLock<HashMap<String, String>>,
    records: RwLock<HashMap<String, ItemRecord>>,
}

/// Entry counts, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub listing_urls: usize,
    pub records: usize,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing page last seen holding the item.
    pub async fn listing_url(&self, item_id: &str) -> Option<String> {
        self.listing_urls.read().await.get(item_id).cloned()
    }

    pub async fn set_listing_url(&self, item_id: &str, url: &str) {
        self.listing_urls
            .write()
            .await
            .insert(item_id.to_string(), url.to_string());
    }

    pub async fn record(&self, item_id: &str) -> Option<ItemRecord> {
        self.records.read().await.get(item_id).cloned()
    }

    pub async fn set_record(&self, record: ItemRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            listing_urls: self.listing_urls.read().await.len(),
            records: self.records.read().await.len(),
        }
    }
}
