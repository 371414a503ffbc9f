//! Catalog and item types.

use serde::{Deserialize, Serialize};

use crate::config::RecordDefaults;
use crate::text::normalize_text;

/// A discovered category on the source site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogRef {
    /// Catalog id (`<prefix>-<index>`).
    pub id: String,
    /// Normalized display name.
    pub name: String,
    /// First page of the catalog's item listing.
    pub listing_url: String,
}

/// One row of a listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemSummary {
    /// Site item id (second-to-last segment of the detail href).
    pub id: String,
    /// Title as shown on the listing.
    pub title: String,
    /// Poster URL, normalized to the canonical size variant.
    pub poster_url: String,
}

/// Display-ready form of an [`ItemSummary`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemRecord {
    pub id: String,
    /// Normalized title.
    pub title: String,
    pub poster: String,
    pub background: String,
    pub logo: String,
    pub description: String,
    pub runtime: String,
    pub language: String,
    pub country: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl ItemRecord {
    /// Enrich a listing summary with normalized text and record defaults.
    pub fn from_summary(summary: &ItemSummary, defaults: &RecordDefaults) -> Self {
        let title = normalize_text(&summary.title);
        Self {
            id: summary.id.clone(),
            description: title.clone(),
            title,
            poster: summary.poster_url.clone(),
            background: summary.poster_url.clone(),
            logo: summary.poster_url.clone(),
            runtime: defaults.runtime.clone(),
            language: defaults.language.clone(),
            country: defaults.country.clone(),
            genres: defaults.genres.clone(),
        }
    }
}

/// One resolvable rendition of an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamCandidate {
    /// Quality label from the download listing (e.g., "720p").
    pub quality_label: String,
    /// Directly playable URL.
    pub resolved_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_summary() {
        let summary = ItemSummary {
            id: "4821".to_string(),
            title: "R@ja Babu".to_string(),
            poster_url: "https://cdn.site/p_3.jpg".to_string(),
        };

        let record = ItemRecord::from_summary(&summary, &RecordDefaults::default());
        assert_eq!(record.id, "4821");
        assert_eq!(record.title, "Raja Babu");
        assert_eq!(record.description, "Raja Babu");
        assert_eq!(record.poster, summary.poster_url);
        assert_eq!(record.background, summary.poster_url);
        assert_eq!(record.logo, summary.poster_url);
        assert_eq!(record.runtime, "120 min");
        assert_eq!(record.language, "Bhojpuri");
        assert_eq!(record.country, "IN");
        assert_eq!(record.genres, vec!["Bhojpuri"]);
    }
}
