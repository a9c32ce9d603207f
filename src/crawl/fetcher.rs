//! Page fetching boundary for the crawler

#[cfg(test)]
use mockall::automock;

use tracing::debug;

use crate::crawl::error::FetchError;

/// Trait for fetching one listing page by URL
///
/// Distinguishes three outcomes: a page body, an "absent" page (any
/// non-success HTTP status), and a transport fault. Absence is a normal
/// per-branch condition; only transport faults are errors. No retries are
/// performed at this layer.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page body, or `None` when the server answered with a
    /// non-success status.
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError>;
}

/// Production fetcher backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("cds-scout")
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Reuse an existing client, keeping one connection pool per process.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!("Page absent ({}): {}", status, url);
            return Ok(None);
        }

        let body = response.text().await?;
        Ok(Some(body))
    }
}
