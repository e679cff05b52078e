use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{extract_visible_text, PageFetcher};
use crate::error::{KgqaError, Result};

/// Per-page timeout used when none is configured
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) const USER_AGENT: &str = concat!("kgqa/", env!("CARGO_PKG_VERSION"));

/// Plain HTTP GET + visible-text extraction
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| KgqaError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| KgqaError::Network(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("GET {} returned {}", url, status);
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| KgqaError::Network(format!("Failed to read {}: {}", url, e)))?;

        let text = extract_visible_text(&body);
        Ok((!text.is_empty()).then_some(text))
    }
}
