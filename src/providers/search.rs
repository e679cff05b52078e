use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

use super::fetch::USER_AGENT;
use super::SearchProvider;
use crate::error::{KgqaError, Result};

/// DuckDuckGo's JavaScript-free results page
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Web search over an HTML results page, returning the first organic link
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| KgqaError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

fn result_anchor_regex() -> &'static Regex {
    static ANCHOR: OnceLock<Regex> = OnceLock::new();
    ANCHOR.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*class="[^"]*\bresult__a\b[^"]*"[^>]*>"#).expect("Invalid anchor regex")
    })
}

fn href_regex() -> &'static Regex {
    static HREF: OnceLock<Regex> = OnceLock::new();
    HREF.get_or_init(|| Regex::new(r#"(?i)\bhref="([^"]+)""#).expect("Invalid href regex"))
}

/// Resolve a result href to the destination URL
///
/// Result links are usually redirects like `//duckduckgo.com/l/?uddg=<encoded>`.
pub(crate) fn resolve_result_href(href: &str) -> Option<String> {
    let href = href.replace("&amp;", "&");
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href
    };
    let parsed = Url::parse(&absolute).ok()?;

    if let Some((_, target)) = parsed.query_pairs().find(|(key, _)| key == "uddg") {
        let target = Url::parse(&target).ok()?;
        return matches!(target.scheme(), "http" | "https").then(|| target.to_string());
    }

    matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
}

/// First result link on a results page, if any
pub(crate) fn first_result_url(page: &str) -> Option<String> {
    result_anchor_regex()
        .find_iter(page)
        .filter_map(|anchor| {
            href_regex()
                .captures(anchor.as_str())
                .and_then(|caps| resolve_result_href(&caps[1]))
        })
        .next()
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn top_result(&self, query: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| KgqaError::Search(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KgqaError::Search(format!("search returned {} for {:?}", status, query)));
        }

        let page = response
            .text()
            .await
            .map_err(|e| KgqaError::Search(format!("Failed to read results: {}", e)))?;

        let url = first_result_url(&page);
        log::debug!("Search {:?} -> {:?}", query, url);
        Ok(url)
    }
}
