//! Per-node descriptions: cache, pre-computed tables, web fallback chain and
//! LLM refinement

mod prompt;
mod table;

pub use prompt::{refine_prompt, truncate_raw, MAX_RAW_CHARS, NO_DESCRIPTION};
pub use table::{DescriptionTable, TableKind, SEEDED_NOT_FOUND};

use std::collections::HashMap;
use std::sync::Mutex;

use crate::cache::PageCache;
use crate::graph::{GraphStore, Node};
use crate::services::Services;
use crate::{KgqaError, Result};

const DEFAULT_PAGE_CACHE_CAPACITY: usize = 256;

/// Treat soft failures as "no result"; only fatal errors propagate
fn soften<T>(result: Result<Option<T>>, what: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            log::debug!("{} gave no result: {}", what, e);
            Ok(None)
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Produces one refined description per node and remembers it for the run
pub struct DescriptionEnricher {
    services: Services,
    pages: PageCache,
    seeded: Option<DescriptionTable>,
    refined: Option<DescriptionTable>,
    cache: Mutex<HashMap<String, String>>,
}

impl DescriptionEnricher {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            pages: PageCache::new(DEFAULT_PAGE_CACHE_CAPACITY),
            seeded: None,
            refined: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_page_cache_capacity(mut self, capacity: usize) -> Self {
        self.pages = PageCache::new(capacity);
        self
    }

    /// Raw descriptions from the seeding job; skips the web fallback chain
    pub fn with_seeded(mut self, table: DescriptionTable) -> Self {
        self.seeded = Some(table);
        self
    }

    /// Finished descriptions from the refinement job; skips everything
    pub fn with_refined(mut self, table: DescriptionTable) -> Self {
        self.refined = Some(table);
        self
    }

    pub fn cached(&self, node_id: &str) -> Option<String> {
        self.cache.lock().unwrap().get(node_id).cloned()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Refined description of `node_id`, computed at most once per run
    pub async fn describe(&self, store: &GraphStore, node_id: &str) -> Result<String> {
        if let Some(hit) = self.cached(node_id) {
            log::debug!("Description cache hit for {}", node_id);
            return Ok(hit);
        }

        let node = store
            .node(node_id)
            .ok_or_else(|| KgqaError::NodeNotFound(node_id.to_string()))?;

        let description = match self.refined.as_ref().and_then(|t| t.get(node_id)) {
            Some(text) => text.to_string(),
            None => {
                let raw = match self.seeded.as_ref().and_then(|t| t.get(node_id)) {
                    Some(text) => text.to_string(),
                    None => self.raw_description(node).await?,
                };
                self.refine(node, &raw).await?
            }
        };

        // first writer wins so concurrent callers all see the same text
        let mut cache = self.cache.lock().unwrap();
        Ok(cache.entry(node_id.to_string()).or_insert(description).clone())
    }

    /// Describe each id once, in order
    pub async fn describe_all<'a, I>(&self, store: &GraphStore, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in ids {
            let description = self.describe(store, id).await?;
            log::debug!("{}: {}", id, description);
        }
        Ok(())
    }

    /// First non-empty text from: node url, search on `source`, shipped
    /// description, search on the name; else the placeholder
    async fn raw_description(&self, node: &Node) -> Result<String> {
        if let Some(url) = non_blank(&node.data.url) {
            if let Some(text) = self.page_text(url).await? {
                return Ok(text);
            }
        }

        if let Some(source) = non_blank(&node.data.source) {
            if let Some(text) = self.search_text(source).await? {
                return Ok(text);
            }
        }

        if let Some(existing) = non_blank(&node.data.description) {
            return Ok(existing.to_string());
        }

        let name = node.name.trim();
        if !name.is_empty() {
            if let Some(text) = self.search_text(name).await? {
                return Ok(text);
            }
        }

        log::info!("No description found for {} ({})", node.name, node.identifier);
        Ok(NO_DESCRIPTION.to_string())
    }

    async fn page_text(&self, url: &str) -> Result<Option<String>> {
        if let Some(hit) = self.pages.get(url) {
            return Ok(hit);
        }

        let fetcher = &self.services.fetcher;
        let fetched = self.services.fetch_client.call(|| fetcher.fetch_text(url)).await;
        let text = soften(fetched, url)?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        self.pages.put(url.to_string(), text.clone());
        Ok(text)
    }

    async fn search_text(&self, query: &str) -> Result<Option<String>> {
        let search = &self.services.search;
        let found = self.services.search_client.call(|| search.top_result(query)).await;
        match soften(found, query)? {
            Some(url) => self.page_text(&url).await,
            None => Ok(None),
        }
    }

    /// Condense `raw` with one completion call
    ///
    /// Blank input short-circuits to the placeholder. A non-fatal completion
    /// failure keeps the truncated raw text.
    async fn refine(&self, node: &Node, raw: &str) -> Result<String> {
        let raw = truncate_raw(raw);
        if raw.trim().is_empty() {
            return Ok(NO_DESCRIPTION.to_string());
        }

        let prompt = refine_prompt(node, &raw);
        let client = &self.services.completion_client;
        match client.complete(self.services.completion.as_ref(), &prompt).await {
            Ok(text) if !text.is_empty() => Ok(text),
            Ok(_) => Ok(raw),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log::warn!("Refine failed for {}: {}; keeping raw description", node.identifier, e);
                Ok(raw)
            }
        }
    }
}
