//! Mock file host for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::file_host::{FileHost, FileHostError};

/// Mock implementation of the FileHost trait.
///
/// Each file id answers with a configured link or API error. Ids nobody
/// configured answer with [`FileHostError::UnexpectedFormat`]. Every
/// exchange is recorded.
///
/// # Example
///
/// ```rust,ignore
/// use raas_core::testing::MockFileHost;
///
/// let host = MockFileHost::new();
/// host.set_link("abc123", "https://cdn.test/abc123.mp4").await;
///
/// assert_eq!(host.exchange("abc123").await?, "https://cdn.test/abc123.mp4");
/// assert_eq!(host.calls().await, vec!["abc123"]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockFileHost {
    responses: Arc<RwLock<HashMap<String, Result<String, String>>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFileHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exchanging `file_id` yields `link`.
    pub async fn set_link(&self, file_id: &str, link: &str) {
        self.responses
            .write()
            .await
            .insert(file_id.to_string(), Ok(link.to_string()));
    }

    /// Exchanging `file_id` fails with an API error carrying `message`.
    pub async fn set_error(&self, file_id: &str, message: &str) {
        self.responses
            .write()
            .await
            .insert(file_id.to_string(), Err(message.to_string()));
    }

    /// File ids exchanged so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl FileHost for MockFileHost {
    async fn exchange(&self, file_id: &str) -> Result<String, FileHostError> {
        self.calls.write().await.push(file_id.to_string());

        match self.responses.read().await.get(file_id) {
            Some(Ok(link)) => Ok(link.clone()),
            Some(Err(message)) => Err(FileHostError::Api(message.clone())),
            None => Err(FileHostError::UnexpectedFormat(format!(
                "no response configured for {}",
                file_id
            ))),
        }
    }
}
