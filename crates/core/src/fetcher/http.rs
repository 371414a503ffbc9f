//! reqwest-backed fetcher.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::FetcherConfig;

use super::{FetchError, Fetched, Fetcher};

/// HTTP fetcher with a fixed browser identity and bounded retries.
pub struct HttpFetcher {
    client: Client,
    config: FetcherConfig,
    file_host_marker: String,
}

impl HttpFetcher {
    /// Create a fetcher that identifies as `user_agent` and short-circuits
    /// GETs landing on URLs containing `file_host_marker`.
    pub fn new(
        config: FetcherConfig,
        user_agent: &str,
        file_host_marker: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            file_host_marker: file_host_marker.to_string(),
        })
    }

    /// Run `op` until it succeeds or `max_attempts` is reached.
    async fn with_retry<T, F, Fut>(
        &self,
        method: &'static str,
        url: &str,
        op: F,
    ) -> Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        method,
                        url,
                        attempt,
                        max_attempts,
                        error = %e,
                        "Fetch attempt failed"
                    );
                    if attempt >= max_attempts {
                        return Err(e);
                    }
                    attempt += 1;
                    if self.config.retry_delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms))
                            .await;
                    }
                }
            }
        }
    }

    fn is_file_host(&self, url: &str) -> bool {
        url.contains(&self.file_host_marker)
    }

    async fn get_once(&self, url: &str) -> Result<Fetched, FetchError> {
        let response = self.client.get(url).send().await?;
        let final_url = response.url().to_string();

        if self.is_file_host(&final_url) {
            debug!(url, final_url = %final_url, "Redirected to file host");
            return Ok(Fetched::FileHost(final_url));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Fetched::Body(response.text().await?))
    }

    async fn head_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.head(url).send().await?;
        let final_url = response.url().to_string();

        let status = response.status();
        if !status.is_success() && !self.is_file_host(&final_url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(final_url)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Fetched, FetchError> {
        debug!(url, "GET");
        self.with_retry("GET", url, || self.get_once(url)).await
    }

    async fn head(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "HEAD");
        self.with_retry("HEAD", url, || self.head_once(url)).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let mut request = self.client.post(url).form(form);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        debug!(url, status = response.status().as_u16(), "POST complete");

        Ok(response.text().await?)
    }
}
