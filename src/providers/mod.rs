//! External services behind narrow traits: completions, web search, page fetch

pub mod completion;
pub mod fetch;
pub mod html;
pub mod search;

pub use completion::ChatCompletionClient;
pub use fetch::HttpPageFetcher;
pub use html::extract_visible_text;
pub use search::DuckDuckGoSearch;

use async_trait::async_trait;

use crate::Result;

/// Chat completion with a single user message
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Web search returning the top result's URL
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// `Ok(None)` when the search succeeded but found nothing
    async fn top_result(&self, query: &str) -> Result<Option<String>>;
}

/// Downloads a page and returns its visible text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// `Ok(None)` for non-success statuses or pages without text;
    /// `Err` only for transport failures
    async fn fetch_text(&self, url: &str) -> Result<Option<String>>;
}
