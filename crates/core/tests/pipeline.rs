//! End-to-end pipeline tests against a scripted site.
//!
//! These tests drive the add-on service, walker and locator with a
//! [`MockFetcher`] and [`MockFileHost`]:
//! - Pagination bounds and fetch counts
//! - Item location and cache reuse
//! - Stream resolution across direct and file-host qualities
//! - Search and malformed markup

use std::sync::Arc;

use raas_core::{
    testing::{fixtures, MockFetcher, MockFileHost},
    AddonService, CatalogDirectory, Config, ItemLocator, ListingWalker, LocateOutcome,
    LookupCache, PageReader, SitePageReader, WalkerOptions,
};

const LISTING_URL: &str = "https://site.test/cat/new/1.html";
const CATALOG_ID: &str = "bhojpuriraas-0";

/// Service, locator and walker sharing one fetcher and cache.
struct TestHarness {
    service: AddonService,
    locator: ItemLocator,
    walker: ListingWalker,
    fetcher: Arc<MockFetcher>,
    file_host: MockFileHost,
    cache: Arc<LookupCache>,
}

impl TestHarness {
    fn new() -> Self {
        let mut config = Config::default();
        config.site.base_url = fixtures::BASE_URL.to_string();

        let fetcher = Arc::new(MockFetcher::new());
        let file_host = MockFileHost::new();
        let cache = Arc::new(LookupCache::new());
        let reader: Arc<dyn PageReader> =
            Arc::new(SitePageReader::with_defaults().expect("Default selectors must parse"));

        let catalogs = Arc::new(CatalogDirectory::new(
            fetcher.clone(),
            Arc::clone(&reader),
            fixtures::BASE_URL,
            &config.addon.catalog_prefix,
        ));
        let locator = ItemLocator::new(
            fetcher.clone(),
            Arc::clone(&reader),
            Arc::clone(&cache),
            catalogs,
            config.walker.max_pages,
        );
        let walker = ListingWalker::new(
            fetcher.clone(),
            Arc::clone(&reader),
            Arc::clone(&cache),
            WalkerOptions::from_config(&config),
        );
        let service = AddonService::new(
            config,
            fetcher.clone(),
            reader,
            Arc::new(file_host.clone()),
            Arc::clone(&cache),
        );

        Self {
            service,
            locator,
            walker,
            fetcher,
            file_host,
            cache,
        }
    }

    /// Home page, category page and a single "New Movies" catalog.
    fn script_catalogs(&self) {
        self.fetcher
            .page(fixtures::BASE_URL, fixtures::home_page("/category/all.html"))
            .page(
                "https://site.test/category/all.html",
                fixtures::category_page(&[("New Movies", "/cat/new/1.html")]),
            );
    }

    /// Item 4821 on the first listing page with three qualities:
    /// 480p via the file host, 720p direct, 1080p via the file host.
    fn script_item_with_qualities(&self) {
        self.script_catalogs();
        self.fetcher
            .page(
                LISTING_URL,
                fixtures::listing_page(&[fixtures::item("4821", "R@ja Babu")], None),
            )
            .page(
                "https://site.test/movies/fl/4821/1.html",
                fixtures::download_listing_page(&[
                    ("480p", "/file/4821/480.html"),
                    ("720p", "/file/4821/720.html"),
                    ("1080p", "/file/4821/1080.html"),
                ]),
            );

        for quality in ["480", "720", "1080"] {
            self.fetcher.page(
                &format!("https://site.test/file/4821/{}.html", quality),
                fixtures::download_page(Some(&format!("/go/4821/{}", quality))),
            );
        }

        self.fetcher
            .head_redirect("https://site.test/go/4821/480", "https://easyupload.io/eu480")
            .file_host("https://site.test/go/4821/480", "https://easyupload.io/eu480")
            .head_redirect(
                "https://site.test/go/4821/720",
                "https://cdn.site.test/4821_720.mp4",
            )
            .head_redirect("https://site.test/go/4821/1080", "https://easyupload.io/eu1080")
            .file_host("https://site.test/go/4821/1080", "https://easyupload.io/eu1080");
    }
}

#[tokio::test]
async fn test_walk_visits_at_most_eight_pages() {
    let h = TestHarness::new();
    for n in 1..=12 {
        h.fetcher.page(
            &format!("https://site.test/cat/new/{}.html", n),
            fixtures::listing_page(
                &[fixtures::item(&n.to_string(), &format!("Film {}", n))],
                Some(&format!("/cat/new/{}.html", n + 1)),
            ),
        );
    }

    let items = h.walker.walk_all(LISTING_URL).await.unwrap();

    assert_eq!(items.len(), 8);
    assert_eq!(h.fetcher.count_method("GET"), 8);
    assert_eq!(h.fetcher.count("GET", "https://site.test/cat/new/9.html"), 0);
}

#[tokio::test]
async fn test_list_items_two_pages_two_fetches() {
    let h = TestHarness::new();
    h.script_catalogs();
    h.fetcher
        .page(
            LISTING_URL,
            fixtures::listing_page(
                &[fixtures::item("1", "A"), fixtures::item("2", "B")],
                Some("/cat/new/2.html"),
            ),
        )
        .page(
            "https://site.test/cat/new/2.html",
            fixtures::listing_page(&[fixtures::item("3", "C")], None),
        );

    assert_eq!(h.service.initialize().await.len(), 1);
    h.fetcher.clear_requests();

    let records = h.service.list_items(CATALOG_ID, None).await;

    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);

    // Rediscovery costs the home and category pages; the listing itself
    // takes exactly two page fetches.
    let listing_fetches: Vec<String> = h
        .fetcher
        .requests()
        .into_iter()
        .filter(|r| r.url.starts_with("https://site.test/cat/new/"))
        .map(|r| r.url)
        .collect();
    assert_eq!(
        listing_fetches,
        vec![LISTING_URL, "https://site.test/cat/new/2.html"]
    );
}

#[tokio::test]
async fn test_list_items_follows_reordered_categories() {
    let h = TestHarness::new();
    h.script_catalogs();
    h.fetcher
        .page(
            LISTING_URL,
            fixtures::listing_page(&[fixtures::item("1", "Newbie")], None),
        )
        .page(
            "https://site.test/cat/old/1.html",
            fixtures::listing_page(&[fixtures::item("2", "Oldie")], None),
        );
    h.service.initialize().await;

    // The site moves "Old Movies" to the front after startup.
    h.fetcher.page(
        "https://site.test/category/all.html",
        fixtures::category_page(&[
            ("Old Movies", "/cat/old/1.html"),
            ("New Movies", "/cat/new/1.html"),
        ]),
    );
    h.fetcher.clear_requests();

    let records = h.service.list_items(CATALOG_ID, None).await;
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Oldie"]);
    assert_eq!(h.fetcher.count("GET", LISTING_URL), 0);
    assert_eq!(h.service.list_catalogs().await[0].name, "Old Movies");
}

#[tokio::test]
async fn test_list_items_keeps_catalogs_when_discovery_fails() {
    let h = TestHarness::new();
    h.script_catalogs();
    h.fetcher.page(
        LISTING_URL,
        fixtures::listing_page(&[fixtures::item("1", "A")], None),
    );
    h.service.initialize().await;

    h.fetcher.fail(fixtures::BASE_URL);

    assert_eq!(h.service.list_items(CATALOG_ID, None).await.len(), 1);
    assert_eq!(h.service.list_catalogs().await.len(), 1);
}

#[tokio::test]
async fn test_list_items_discovers_unknown_catalog() {
    let h = TestHarness::new();
    h.script_catalogs();
    h.fetcher.page(
        LISTING_URL,
        fixtures::listing_page(&[fixtures::item("1", "A")], None),
    );

    let records = h.service.list_items(CATALOG_ID, None).await;
    assert_eq!(records.len(), 1);
    assert_eq!(h.service.list_catalogs().await.len(), 1);
}

#[tokio::test]
async fn test_search_matches_normalized_title() {
    let h = TestHarness::new();
    h.script_catalogs();
    h.fetcher.page(
        LISTING_URL,
        fixtures::listing_page(
            &[
                fixtures::item("1", "R@ja Babu"),
                fixtures::item("2", "Other Film"),
            ],
            None,
        ),
    );
    h.service.initialize().await;

    let records = h.service.list_items(CATALOG_ID, Some("raja")).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Raja Babu");

    // Non-matching entries are still cached.
    assert!(h.cache.record("2").await.is_some());

    // Blank search lists everything.
    assert_eq!(h.service.list_items(CATALOG_ID, Some("  ")).await.len(), 2);
}

#[tokio::test]
async fn test_malformed_entries_skipped_individually() {
    let h = TestHarness::new();
    h.fetcher.page(
        LISTING_URL,
        fixtures::listing_page_raw(
            &[
                fixtures::listing_entry(
                    Some("/movies/1/good.html"),
                    Some("Good One"),
                    Some("https://img.site.test/1_1.jpg"),
                ),
                fixtures::listing_entry(None, Some("No Link"), Some("https://img.site.test/2_1.jpg")),
                fixtures::listing_entry(Some("/movies/3/untitled.html"), None, Some("https://img.site.test/3_1.jpg")),
                fixtures::listing_entry(Some("/movies/4/no-poster.html"), Some("No Poster"), None),
                fixtures::listing_entry(
                    Some("/movies/5/good.html"),
                    Some("Good Two"),
                    Some("https://img.site.test/5_3.jpg"),
                ),
            ],
            None,
        ),
    );

    let items = h.walker.walk_all(LISTING_URL).await.unwrap();

    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "5"]);
    assert!(items.iter().all(|i| !i.title.is_empty() && !i.poster_url.is_empty()));
    assert_eq!(items[0].poster_url, "https://img.site.test/1_3.jpg");
    assert_eq!(items[1].poster_url, "https://img.site.test/5_3.jpg");
}

#[tokio::test]
async fn test_locate_is_idempotent_with_warm_cache() {
    let h = TestHarness::new();
    h.fetcher
        .page(
            LISTING_URL,
            fixtures::listing_page(&[fixtures::item("1", "A")], Some("/cat/new/2.html")),
        )
        .page(
            "https://site.test/cat/new/2.html",
            fixtures::listing_page(&[fixtures::item("2", "B")], None),
        );

    let first = h.locator.locate(LISTING_URL, "2").await.unwrap();
    let fetches = h.fetcher.requests().len();
    let second = h.locator.locate(LISTING_URL, "2").await.unwrap();

    assert_eq!(
        first,
        LocateOutcome::Found("https://site.test/cat/new/2.html".to_string())
    );
    assert_eq!(first, second);
    assert_eq!(h.fetcher.requests().len(), fetches);
}

#[tokio::test]
async fn test_locate_anywhere_not_found() {
    let h = TestHarness::new();
    h.script_catalogs();
    h.fetcher.page(
        LISTING_URL,
        fixtures::listing_page(&[fixtures::item("1", "A")], None),
    );

    assert_eq!(h.locator.locate_anywhere("999").await, LocateOutcome::NotFound);
}

#[tokio::test]
async fn test_streams_mix_direct_and_file_host() {
    let h = TestHarness::new();
    h.script_item_with_qualities();
    h.file_host.set_link("eu480", "https://dl.easyupload.io/eu480/film.mp4").await;
    h.file_host.set_link("eu1080", "https://dl.easyupload.io/eu1080/film.mp4").await;

    let streams = h.service.get_streams("4821").await;

    let labels: Vec<&str> = streams.iter().map(|s| s.quality_label.as_str()).collect();
    assert_eq!(labels, vec!["480p", "720p", "1080p"]);
    assert_eq!(streams[1].resolved_url, "https://cdn.site.test/4821_720.mp4");
    assert_eq!(h.file_host.calls().await, vec!["eu480", "eu1080"]);
}

#[tokio::test]
async fn test_direct_file_skips_token_client() {
    let h = TestHarness::new();
    h.script_item_with_qualities();
    h.fetcher
        .head_redirect("https://site.test/go/4821/480", "https://cdn.site.test/4821_480.mp4")
        .head_redirect("https://site.test/go/4821/1080", "https://cdn.site.test/4821_1080.mp4");

    let streams = h.service.get_streams("4821").await;

    assert_eq!(streams.len(), 3);
    assert!(streams.iter().all(|s| s.resolved_url.ends_with(".mp4")));
    assert_eq!(h.file_host.call_count().await, 0);
    assert_eq!(h.fetcher.count("GET", "https://site.test/go/4821/720"), 0);
}

#[tokio::test]
async fn test_missing_file_id_omits_quality() {
    let h = TestHarness::new();
    h.script_item_with_qualities();
    h.fetcher
        .file_host("https://site.test/go/4821/480", "https://easyupload.io/");
    h.file_host.set_link("eu1080", "https://dl.easyupload.io/eu1080/film.mp4").await;

    let streams = h.service.get_streams("4821").await;

    let labels: Vec<&str> = streams.iter().map(|s| s.quality_label.as_str()).collect();
    assert_eq!(labels, vec!["720p", "1080p"]);
    assert_eq!(h.file_host.calls().await, vec!["eu1080"]);
}

#[tokio::test]
async fn test_token_error_omits_quality_without_retry() {
    let h = TestHarness::new();
    h.script_item_with_qualities();
    h.file_host.set_error("eu480", "File not found").await;
    h.file_host.set_link("eu1080", "https://dl.easyupload.io/eu1080/film.mp4").await;

    let streams = h.service.get_streams("4821").await;

    let labels: Vec<&str> = streams.iter().map(|s| s.quality_label.as_str()).collect();
    assert_eq!(labels, vec!["720p", "1080p"]);
    assert_eq!(h.file_host.calls().await, vec!["eu480", "eu1080"]);
}

#[tokio::test]
async fn test_middle_quality_failure_keeps_neighbours() {
    let h = TestHarness::new();
    h.script_item_with_qualities();
    h.fetcher.fail_head("https://site.test/go/4821/720");
    h.file_host.set_link("eu480", "https://dl.easyupload.io/eu480/film.mp4").await;
    h.file_host.set_link("eu1080", "https://dl.easyupload.io/eu1080/film.mp4").await;

    let streams = h.service.get_streams("4821").await;

    let labels: Vec<&str> = streams.iter().map(|s| s.quality_label.as_str()).collect();
    assert_eq!(labels, vec!["480p", "1080p"]);
}

#[tokio::test]
async fn test_missing_redirect_link_omits_quality() {
    let h = TestHarness::new();
    h.script_item_with_qualities();
    h.fetcher
        .page("https://site.test/file/4821/480.html", fixtures::download_page(None));
    h.file_host.set_link("eu1080", "https://dl.easyupload.io/eu1080/film.mp4").await;

    let streams = h.service.get_streams("4821").await;
    assert_eq!(streams.len(), 2);
    assert_eq!(h.fetcher.count_method("HEAD"), 2);
}

#[tokio::test]
async fn test_streams_for_unknown_item_are_empty() {
    let h = TestHarness::new();
    h.script_item_with_qualities();

    assert!(h.service.get_streams("0000").await.is_empty());
    assert_eq!(h.fetcher.count_method("HEAD"), 0);
}

#[tokio::test]
async fn test_meta_rewalks_located_listing() {
    let h = TestHarness::new();
    h.fetcher.page(
        LISTING_URL,
        fixtures::listing_page(&[fixtures::item("4821", "R@ja Babu")], None),
    );

    // Locating caches the page without a record.
    h.locator.locate(LISTING_URL, "4821").await.unwrap();
    assert!(h.cache.record("4821").await.is_none());

    let meta = h.service.get_item_meta("4821").await.unwrap();
    assert_eq!(meta.title, "Raja Babu");
    assert_eq!(meta.poster, "https://img.site.test/posters/4821_3.jpg");
    assert_eq!(meta.genres, vec!["Bhojpuri"]);
}
