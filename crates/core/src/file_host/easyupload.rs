//! easyupload token API client.
//!
//! The host hands out direct links through a form POST that carries the
//! file id and a pinned captcha token. Responses are JSON; only a truthy
//! `status` together with a `download_link` counts as success.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FileHostConfig;
use crate::fetcher::Fetcher;

use super::{FileHost, FileHostError};

/// Token client for easyupload.
pub struct EasyUploadClient {
    fetcher: Arc<dyn Fetcher>,
    config: FileHostConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    download_link: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

impl EasyUploadClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: FileHostConfig) -> Self {
        Self { fetcher, config }
    }
}

/// JSON truthiness as the host's own frontend applies it.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn error_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn a token API body into a link or an error.
fn interpret_response(body: &str) -> Result<String, FileHostError> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| FileHostError::UnexpectedFormat(format!("invalid JSON: {}", e)))?;

    if is_truthy(&response.status) {
        if let Some(link) = response.download_link.as_deref().map(str::trim) {
            if !link.is_empty() {
                return Ok(link.to_string());
            }
        }
    }

    if let Some(error) = response.error.as_ref().filter(|e| is_truthy(e)) {
        return Err(FileHostError::Api(error_message(error)));
    }

    Err(FileHostError::UnexpectedFormat(body.chars().take(200).collect()))
}

#[async_trait]
impl FileHost for EasyUploadClient {
    async fn exchange(&self, file_id: &str) -> Result<String, FileHostError> {
        let referer = format!("{}/{}", self.config.origin.trim_end_matches('/'), file_id);
        let form = [
            ("type", "download-token"),
            ("url", file_id),
            ("value", ""),
            ("captchatoken", self.config.captcha_token.as_str()),
            ("method", self.config.transfer_method.as_str()),
        ];
        let headers = [
            ("Origin", self.config.origin.as_str()),
            ("Referer", referer.as_str()),
        ];

        debug!(file_id, "Requesting download token");
        let body = self
            .fetcher
            .post_form(&self.config.api_url, &form, &headers)
            .await?;

        match interpret_response(&body) {
            Ok(link) => {
                debug!(file_id, "Download token granted");
                Ok(link)
            }
            Err(e) => {
                warn!(file_id, error = %e, "Download token refused");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockFetcher};

    const API_URL: &str = "https://eu4.easyupload.io/action.php";

    fn client(fetcher: Arc<MockFetcher>) -> EasyUploadClient {
        EasyUploadClient::new(fetcher, FileHostConfig::default())
    }

    #[test]
    fn test_interpret_success_trims_link() {
        let body = r#"{"status": true, "download_link": "  https://cdn.test/a.mp4\n"}"#;
        assert_eq!(interpret_response(body).unwrap(), "https://cdn.test/a.mp4");
    }

    #[test]
    fn test_interpret_truthy_status_values() {
        let body = r#"{"status": 1, "download_link": "https://cdn.test/a.mp4"}"#;
        assert!(interpret_response(body).is_ok());

        let body = r#"{"status": "ok", "download_link": "https://cdn.test/a.mp4"}"#;
        assert!(interpret_response(body).is_ok());
    }

    #[test]
    fn test_interpret_error_field() {
        let err = interpret_response(r#"{"status": false, "error": "Captcha failed"}"#).unwrap_err();
        assert!(matches!(err, FileHostError::Api(msg) if msg == "Captcha failed"));
    }

    #[test]
    fn test_interpret_unexpected_shapes() {
        for body in [
            r#"{"status": true}"#,
            r#"{"status": false, "download_link": "https://cdn.test/a.mp4"}"#,
            r#"{"status": true, "download_link": "   "}"#,
            r#"{}"#,
            "<html>blocked</html>",
        ] {
            assert!(
                matches!(interpret_response(body), Err(FileHostError::UnexpectedFormat(_))),
                "body: {}",
                body
            );
        }
    }

    #[tokio::test]
    async fn test_exchange_sends_form_and_headers() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.post_response(API_URL, fixtures::token_success("https://cdn.test/x.mp4"));

        let link = client(Arc::clone(&fetcher)).exchange("abc123").await.unwrap();
        assert_eq!(link, "https://cdn.test/x.mp4");

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, "POST");

        let field = |name: &str| {
            request
                .form
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(field("type"), Some("download-token"));
        assert_eq!(field("url"), Some("abc123"));
        assert_eq!(field("value"), Some(""));
        assert_eq!(field("captchatoken"), Some("gZx5mn2DRr4wxy2Bvj5FbjtWkZaTeWFC"));
        assert_eq!(field("method"), Some("regular"));

        assert!(request
            .headers
            .contains(&("Origin".to_string(), "https://easyupload.io".to_string())));
        assert!(request.headers.contains(&(
            "Referer".to_string(),
            "https://easyupload.io/abc123".to_string()
        )));
    }

    #[tokio::test]
    async fn test_exchange_error_not_retried() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.post_response(API_URL, fixtures::token_error("File not found"));

        let result = client(Arc::clone(&fetcher)).exchange("gone").await;
        assert!(matches!(result, Err(FileHostError::Api(_))));
        assert_eq!(fetcher.count_method("POST"), 1);
    }
}
