//! Selector-driven reader for the site's markup.

use scraper::{ElementRef, Html, Selector};

use crate::config::SiteSelectors;

use super::{CategoryEntry, ListingEntry, PageReader, PageReaderError, QualityEntry};

/// [`PageReader`] backed by CSS selectors from [`SiteSelectors`].
#[derive(Debug)]
pub struct SitePageReader {
    category_link: Selector,
    listing_entry: Selector,
    catalog_skip_positions: Vec<usize>,
    entry_link: Selector,
    entry_title: Selector,
    entry_poster: Selector,
    next_page_link: Selector,
    next_page_text: String,
    item_link: Selector,
    quality_entry: Selector,
    quality_label: Selector,
    redirect_link: Selector,
}

fn parse_selector(name: &'static str, css: &str) -> Result<Selector, PageReaderError> {
    Selector::parse(css).map_err(|e| PageReaderError::InvalidSelector {
        name,
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn attr_of(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl SitePageReader {
    /// Parse all selectors up front; fails on the first invalid one.
    pub fn new(selectors: &SiteSelectors) -> Result<Self, PageReaderError> {
        Ok(Self {
            category_link: parse_selector("category_link", &selectors.category_link)?,
            listing_entry: parse_selector("listing_entry", &selectors.listing_entry)?,
            catalog_skip_positions: selectors.catalog_skip_positions.clone(),
            entry_link: parse_selector("entry_link", &selectors.entry_link)?,
            entry_title: parse_selector("entry_title", &selectors.entry_title)?,
            entry_poster: parse_selector("entry_poster", &selectors.entry_poster)?,
            next_page_link: parse_selector("next_page_link", &selectors.next_page_link)?,
            next_page_text: selectors.next_page_text.clone(),
            item_link: parse_selector("item_link", &selectors.item_link)?,
            quality_entry: parse_selector("quality_entry", &selectors.quality_entry)?,
            quality_label: parse_selector("quality_label", &selectors.quality_label)?,
            redirect_link: parse_selector("redirect_link", &selectors.redirect_link)?,
        })
    }

    /// Reader for the current site markup.
    pub fn with_defaults() -> Result<Self, PageReaderError> {
        Self::new(&SiteSelectors::default())
    }
}

impl PageReader for SitePageReader {
    fn find_category_link(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let link = document
            .select(&self.category_link)
            .next()
            .and_then(|a| attr_of(a, "href"));
        link
    }

    fn find_catalog_entries(&self, html: &str) -> Vec<CategoryEntry> {
        let document = Html::parse_document(html);
        let entries = document
            .select(&self.listing_entry)
            .enumerate()
            .filter(|(position, _)| !self.catalog_skip_positions.contains(position))
            .map(|(_, entry)| {
                let anchor = entry.select(&self.entry_link).next();
                CategoryEntry {
                    name: anchor.map(text_of).unwrap_or_default(),
                    href: anchor.and_then(|a| attr_of(a, "href")),
                }
            })
            .collect();
        entries
    }

    fn find_listing_entries(&self, html: &str) -> Vec<ListingEntry> {
        let document = Html::parse_document(html);
        let entries = document
            .select(&self.listing_entry)
            .map(|entry| ListingEntry {
                title: entry
                    .select(&self.entry_title)
                    .next()
                    .map(text_of)
                    .filter(|t| !t.is_empty()),
                href: entry
                    .select(&self.entry_link)
                    .next()
                    .and_then(|a| attr_of(a, "href")),
                poster: entry
                    .select(&self.entry_poster)
                    .next()
                    .and_then(|img| attr_of(img, "src")),
            })
            .collect();
        entries
    }

    fn find_next_page_link(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let link = document
            .select(&self.next_page_link)
            .find(|a| text_of(*a).contains(&self.next_page_text))
            .and_then(|a| attr_of(a, "href"));
        link
    }

    fn find_item_link(&self, html: &str, item_id: &str) -> Option<String> {
        let needle = format!("/{}/", item_id);
        let document = Html::parse_document(html);
        let link = document
            .select(&self.item_link)
            .filter_map(|a| attr_of(a, "href"))
            .find(|href| href.contains(&needle));
        link
    }

    fn find_quality_entries(&self, html: &str) -> Vec<QualityEntry> {
        let document = Html::parse_document(html);
        let entries = document
            .select(&self.quality_entry)
            .map(|entry| QualityEntry {
                label: entry
                    .select(&self.quality_label)
                    .next()
                    .map(text_of)
                    .unwrap_or_default(),
                href: attr_of(entry, "href"),
            })
            .collect();
        entries
    }

    fn find_redirect_link(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let link = document
            .select(&self.redirect_link)
            .next()
            .and_then(|a| attr_of(a, "href"));
        link
    }
}
