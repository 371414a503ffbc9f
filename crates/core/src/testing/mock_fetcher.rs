//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::fetcher::{FetchError, Fetched, Fetcher};

/// A recorded request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// "GET", "HEAD" or "POST".
    pub method: &'static str,
    pub url: String,
    /// Form fields (POST only).
    pub form: Vec<(String, String)>,
    /// Extra headers (POST only).
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum Scripted {
    Body(String),
    FileHost(String),
    Fail(String),
}

/// Mock implementation of the Fetcher trait.
///
/// Responses are scripted per URL and stay in place for repeated requests:
/// - GET: page body, file-host landing URL, or failure
/// - HEAD: final URL after redirects, or failure
/// - POST: response body
///
/// Unscripted URLs answer like a 404. Every request is recorded.
#[derive(Debug, Default)]
pub struct MockFetcher {
    gets: Mutex<HashMap<String, Scripted>>,
    heads: Mutex<HashMap<String, Scripted>>,
    posts: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET `url` returns `html`.
    pub fn page(&self, url: &str, html: impl Into<String>) -> &Self {
        self.gets
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Body(html.into()));
        self
    }

    /// GET `url` lands on the file host at `landing_url`.
    pub fn file_host(&self, url: &str, landing_url: &str) -> &Self {
        self.gets
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::FileHost(landing_url.to_string()));
        self
    }

    /// GET `url` fails after retries.
    pub fn fail(&self, url: &str) -> &Self {
        self.gets
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Fail(url.to_string()));
        self
    }

    /// HEAD `url` ends at `final_url`.
    pub fn head_redirect(&self, url: &str, final_url: &str) -> &Self {
        self.heads
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Body(final_url.to_string()));
        self
    }

    /// HEAD `url` fails after retries.
    pub fn fail_head(&self, url: &str) -> &Self {
        self.heads
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Fail(url.to_string()));
        self
    }

    /// POST to `url` answers with `body`.
    pub fn post_response(&self, url: &str, body: impl Into<String>) -> &Self {
        self.posts
            .lock()
            .unwrap()
            .insert(url.to_string(), body.into());
        self
    }

    /// All requests so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests with `method` to `url`.
    pub fn count(&self, method: &str, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    /// Number of requests with `method`.
    pub fn count_method(&self, method: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record(&self, method: &'static str, url: &str) {
        self.record_full(method, url, Vec::new(), Vec::new());
    }

    fn record_full(
        &self,
        method: &'static str,
        url: &str,
        form: Vec<(String, String)>,
        headers: Vec<(String, String)>,
    ) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            form,
            headers,
        });
    }
}

fn not_found(url: &str) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: 404,
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<Fetched, FetchError> {
        self.record("GET", url);
        let scripted = self.gets.lock().unwrap().get(url).cloned();
        match scripted {
            Some(Scripted::Body(body)) => Ok(Fetched::Body(body)),
            Some(Scripted::FileHost(landing)) => Ok(Fetched::FileHost(landing)),
            Some(Scripted::Fail(url)) => Err(FetchError::Connection(format!(
                "simulated failure for {}",
                url
            ))),
            None => Err(not_found(url)),
        }
    }

    async fn head(&self, url: &str) -> Result<String, FetchError> {
        self.record("HEAD", url);
        let scripted = self.heads.lock().unwrap().get(url).cloned();
        match scripted {
            Some(Scripted::Body(final_url)) | Some(Scripted::FileHost(final_url)) => Ok(final_url),
            Some(Scripted::Fail(url)) => Err(FetchError::Connection(format!(
                "simulated failure for {}",
                url
            ))),
            None => Err(not_found(url)),
        }
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let to_owned = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>()
        };
        self.record_full("POST", url, to_owned(form), to_owned(headers));

        let body = self.posts.lock().unwrap().get(url).cloned();
        body.ok_or_else(|| not_found(url))
    }
}
