//! Structural reading of the site's HTML pages.
//!
//! The pipeline never touches markup directly: it asks a [`PageReader`] for
//! the handful of things it needs from each page, and everything else about
//! the site's structure stays inside the reader.

mod site;

pub use site::SitePageReader;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageReaderError {
    #[error("Invalid selector for {name} ('{selector}'): {message}")]
    InvalidSelector {
        name: &'static str,
        selector: String,
        message: String,
    },
}

/// A category entry on the category page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    pub href: Option<String>,
}

/// An entry on a listing page, as found. Missing parts are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: Option<String>,
    pub href: Option<String>,
    pub poster: Option<String>,
}

/// A quality entry on an item's download listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityEntry {
    pub label: String,
    pub href: Option<String>,
}

pub trait PageReader: Send + Sync {
    /// Link from the home page to the category page.
    fn find_category_link(&self, html: &str) -> Option<String>;

    /// Category entries that represent catalogs, in page order.
    fn find_catalog_entries(&self, html: &str) -> Vec<CategoryEntry>;

    /// All entries of a listing page, in page order.
    fn find_listing_entries(&self, html: &str) -> Vec<ListingEntry>;

    /// Href of the "next page" anchor, if any.
    fn find_next_page_link(&self, html: &str) -> Option<String>;

    /// Detail href of the listing entry for `item_id`, if on this page.
    fn find_item_link(&self, html: &str, item_id: &str) -> Option<String>;

    /// Quality entries of a download listing, in page order.
    fn find_quality_entries(&self, html: &str) -> Vec<QualityEntry>;

    /// Redirect link on a quality's download page.
    fn find_redirect_link(&self, html: &str) -> Option<String>;
}

/// Resolve a site href against the site root.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{}{}", base, href)
    } else {
        format!("{}/{}", base, href)
    }
}

/// Path of an href, without scheme, host, query or fragment.
fn href_path(href: &str) -> &str {
    let path = match href.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
        None => href,
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Item id from a detail href: its second-to-last path segment.
///
/// `/movies/4821/raja-babu.html` gives `4821`.
pub fn item_id_from_href(href: &str) -> Option<String> {
    let segments: Vec<&str> = href_path(href).split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    let id = segments[segments.len() - 2];
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Section of a detail href: its first path segment.
///
/// `/movies/4821/raja-babu.html` gives `movies`.
pub fn section_from_href(href: &str) -> Option<String> {
    href_path(href)
        .split('/')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
