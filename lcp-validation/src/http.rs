//! reqwest-backed `NetworkFetcher`.

use crate::error::{LcpError, LcpResult};
use crate::services::NetworkFetcher;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Configuration for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("lcp-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// The shipped HTTP implementation of [`NetworkFetcher`].
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the given configuration.
    #[must_use]
    pub fn new(config: HttpFetcherConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent)
            .build()
            .expect("failed to create HTTP client");
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(HttpFetcherConfig::default())
    }
}

#[async_trait]
impl NetworkFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> LcpResult<Vec<u8>> {
        debug!(url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LcpError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LcpError::Network(format!("GET {url} returned {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LcpError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
