//! Testing utilities and mock implementations.
//!
//! Provides a scripted [`MockFetcher`] and [`MockFileHost`] so the whole
//! pipeline can be exercised without network access, plus HTML fixtures
//! shaped like the real site.
//!
//! # Example
//!
//! ```rust,ignore
//! use raas_core::testing::{fixtures, MockFetcher};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.page(
//!     "https://site.test/cat/new/1.html",
//!     fixtures::listing_page(&[fixtures::item("4821", "R@ja Babu")], None),
//! );
//!
//! // ...run the walker, then assert on fetcher.requests()
//! ```

mod mock_fetcher;
mod mock_file_host;

pub use mock_fetcher::{MockFetcher, RecordedRequest};
pub use mock_file_host::MockFileHost;

/// HTML fixtures matching the default site selectors.
pub mod fixtures {
    /// Base URL used by fixtures and pipeline tests.
    pub const BASE_URL: &str = "https://site.test";

    /// An item as it appears on a listing page.
    #[derive(Debug, Clone)]
    pub struct FixtureItem {
        pub id: String,
        pub title: String,
        pub poster: String,
    }

    impl FixtureItem {
        /// Detail href of the item (`/movies/<id>/<slug>.html`).
        pub fn href(&self) -> String {
            format!("/movies/{}/{}.html", self.id, slug(&self.title))
        }
    }

    fn slug(title: &str) -> String {
        title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect()
    }

    /// Item with a `_1.jpg` poster, as the site serves thumbnails.
    pub fn item(id: &str, title: &str) -> FixtureItem {
        FixtureItem {
            id: id.to_string(),
            title: title.to_string(),
            poster: format!("https://img.site.test/posters/{}_1.jpg", id),
        }
    }

    /// Home page whose second category block links to `category_href`.
    pub fn home_page(category_href: &str) -> String {
        format!(
            r#"<html><body>
<div id="cateogry"><div>
  <div><a href="/latest.html">Latest</a></div>
  <div><a href="{}">Categories</a></div>
</div></div>
</body></html>"#,
            category_href
        )
    }

    /// Category page with a header at position 0 and a divider at position 2
    /// around the given `(name, href)` catalogs.
    pub fn category_page(catalogs: &[(&str, &str)]) -> String {
        let mut entries = vec![r#"<div><a href="/home.html">Home</a></div>"#.to_string()];
        for (i, (name, href)) in catalogs.iter().enumerate() {
            if i == 1 {
                entries.push(r#"<div><a href="/top.html">Top 10</a></div>"#.to_string());
            }
            entries.push(format!(r#"<div><a href="{}">{}</a></div>"#, href, name));
        }
        format!(
            "<html><body><div class=\"catList\">{}</div></body></html>",
            entries.join("\n")
        )
    }

    /// Raw listing entry; any part may be omitted to simulate bad markup.
    pub fn listing_entry(href: Option<&str>, title: Option<&str>, poster: Option<&str>) -> String {
        let img = poster
            .map(|p| format!(r#"<img src="{}">"#, p))
            .unwrap_or_default();
        let title = title
            .map(|t| format!("<div>{}</div>", t))
            .unwrap_or_default();
        let anchor_open = href
            .map(|h| format!(r#"<a href="{}">"#, h))
            .unwrap_or_else(|| "<a>".to_string());
        format!(
            "<div>{}<div><div>{}</div>{}</div></a></div>",
            anchor_open, img, title
        )
    }

    /// Listing page built from raw entries.
    pub fn listing_page_raw(entries: &[String], next_href: Option<&str>) -> String {
        let next = next_href
            .map(|h| format!(r#"<div class="pagination"><a href="{}">Next &gt;</a></div>"#, h))
            .unwrap_or_default();
        format!(
            "<html><body><div class=\"catList\">{}</div>{}</body></html>",
            entries.join("\n"),
            next
        )
    }

    /// Listing page with well-formed entries.
    pub fn listing_page(items: &[FixtureItem], next_href: Option<&str>) -> String {
        let entries: Vec<String> = items
            .iter()
            .map(|item| {
                listing_entry(
                    Some(&item.href()),
                    Some(&item.title),
                    Some(&item.poster),
                )
            })
            .collect();
        listing_page_raw(&entries, next_href)
    }

    /// Download listing with `(label, href)` quality entries.
    pub fn download_listing_page(qualities: &[(&str, &str)]) -> String {
        let entries: Vec<String> = qualities
            .iter()
            .map(|(label, href)| {
                format!(
                    r#"<a class="fileName" href="{}"><div><div><span>{}</span><span>700 MB</span></div></div></a>"#,
                    href, label
                )
            })
            .collect();
        format!("<html><body>{}</body></html>", entries.join("\n"))
    }

    /// Quality download page; `None` omits the redirect link.
    pub fn download_page(redirect_href: Option<&str>) -> String {
        let link = redirect_href
            .map(|h| format!(r#"<a class="dwnLink" href="{}">Download Now</a>"#, h))
            .unwrap_or_default();
        format!("<html><body><h2>Download</h2>{}</body></html>", link)
    }

    /// Successful token exchange payload.
    pub fn token_success(link: &str) -> String {
        serde_json::json!({ "status": true, "download_link": link }).to_string()
    }

    /// Failed token exchange payload.
    pub fn token_error(message: &str) -> String {
        serde_json::json!({ "status": false, "error": message }).to_string()
    }
}
