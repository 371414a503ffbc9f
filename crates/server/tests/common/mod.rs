//! Common test utilities for router testing with mocks.
//!
//! This module provides a test fixture that builds the full router over an
//! add-on service whose network access is scripted, so every route can be
//! exercised without reaching the real site.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use raas_core::{
    testing::{MockFetcher, MockFileHost},
    AddonService, Config, LookupCache, SitePageReader,
};

/// Re-export fixtures for test convenience
pub use raas_core::testing::fixtures;

/// Test fixture for route testing with mock dependencies.
///
/// Provides an in-process router with fully controllable mocks for:
/// - Site pages and redirects (MockFetcher)
/// - Token exchanges (MockFileHost)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_manifest() {
///     let fixture = TestFixture::new();
///     fixture.script_catalogs();
///     fixture.initialize().await;
///
///     let response = fixture.get("/manifest.json").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock fetcher - script site pages
    pub fetcher: Arc<MockFetcher>,
    /// Mock file host - configure token exchanges
    pub file_host: MockFileHost,
    /// Service behind the router
    pub service: Arc<AddonService>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default configuration.
    pub fn new() -> Self {
        let mut config = Config::default();
        config.site.base_url = fixtures::BASE_URL.to_string();
        Self::with_config(config)
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let fetcher = Arc::new(MockFetcher::new());
        let file_host = MockFileHost::new();

        let service = Arc::new(AddonService::new(
            config,
            fetcher.clone(),
            Arc::new(SitePageReader::with_defaults().expect("Default selectors must parse")),
            Arc::new(file_host.clone()),
            Arc::new(LookupCache::new()),
        ));

        let state = Arc::new(raas_server::state::AppState::new(Arc::clone(&service)));
        let router = raas_server::api::create_router(state);

        Self {
            router,
            fetcher,
            file_host,
            service,
        }
    }

    /// Home page, category page and two catalogs.
    pub fn script_catalogs(&self) {
        self.fetcher
            .page(fixtures::BASE_URL, fixtures::home_page("/category/all.html"))
            .page(
                "https://site.test/category/all.html",
                fixtures::category_page(&[
                    ("New Movies", "/cat/new/1.html"),
                    ("Old M0vies", "/cat/old/1.html"),
                ]),
            );
    }

    /// Listing of the first catalog.
    pub fn script_listing(&self, items: &[fixtures::FixtureItem]) {
        self.fetcher.page(
            "https://site.test/cat/new/1.html",
            fixtures::listing_page(items, None),
        );
    }

    /// Item `id` with a direct 720p file and a 480p file-host download.
    pub fn script_streams(&self, id: &str) {
        self.fetcher
            .page(
                &format!("https://site.test/movies/fl/{}/1.html", id),
                fixtures::download_listing_page(&[
                    ("720p", &format!("/file/{}/720.html", id)),
                    ("480p", &format!("/file/{}/480.html", id)),
                ]),
            )
            .page(
                &format!("https://site.test/file/{}/720.html", id),
                fixtures::download_page(Some(&format!("/go/{}/720", id))),
            )
            .page(
                &format!("https://site.test/file/{}/480.html", id),
                fixtures::download_page(Some(&format!("/go/{}/480", id))),
            )
            .head_redirect(
                &format!("https://site.test/go/{}/720", id),
                &format!("https://cdn.site.test/{}_720.mp4", id),
            )
            .head_redirect(
                &format!("https://site.test/go/{}/480", id),
                &format!("https://easyupload.io/eu{}", id),
            )
            .file_host(
                &format!("https://site.test/go/{}/480", id),
                &format!("https://easyupload.io/eu{}", id),
            );
    }

    /// Run catalog discovery as the server does at startup.
    pub async fn initialize(&self) {
        self.service.initialize().await;
    }

    /// Send a GET request to the test router.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
