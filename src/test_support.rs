//! Deterministic stand-ins for the external collaborators

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::{
    ApproximateTokenizer, RateLimitedClient, TokenPacer, COMPLETION_BACKOFF, DEFAULT_MAX_STRIKES, WEB_BACKOFF,
};
use crate::providers::{CompletionProvider, PageFetcher, SearchProvider};
use crate::retrieval::TextChunker;
use crate::services::Services;
use crate::{KgqaError, Result};

/// Returns the same phrases for every query
pub struct FixedChunker(Vec<String>);

impl FixedChunker {
    pub fn new(phrases: &[&str]) -> Self {
        Self(phrases.iter().map(|p| p.to_string()).collect())
    }
}

impl TextChunker for FixedChunker {
    fn noun_phrases(&self, _text: &str) -> Vec<String> {
        self.0.clone()
    }
}

/// Completion provider answering from a script, then a fallback
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Result<String>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn scripted(script: Vec<Result<String>>, fallback: Option<&str>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: fallback.map(str::to_string),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::scripted(Vec::new(), Some(text))
    }

    pub fn failing() -> Self {
        Self::scripted(Vec::new(), None)
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(text) => Ok(text.clone()),
            None => Err(KgqaError::Completion("API error 503: unavailable".to_string())),
        }
    }
}

/// Search provider backed by a query → URL map
#[derive(Default)]
pub struct FakeSearch {
    results: HashMap<String, String>,
    failing: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn with_result(mut self, query: &str, url: &str) -> Self {
        self.results.insert(query.to_string(), url.to_string());
        self
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn top_result(&self, query: &str) -> Result<Option<String>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.failing {
            return Err(KgqaError::Search("search returned 429".to_string()));
        }
        Ok(self.results.get(query).cloned())
    }
}

/// Page fetcher backed by a URL → text map
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    broken: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    /// Transport failure for `url`
    pub fn with_broken(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.broken.contains(url) {
            return Err(KgqaError::Network(format!("GET {} timed out", url)));
        }
        Ok(self.pages.get(url).cloned())
    }
}

/// Services over fakes with the production backoffs; run under paused time
pub fn fake_services(
    fetcher: Arc<FakeFetcher>,
    search: Arc<FakeSearch>,
    completion: Arc<ScriptedCompletion>,
) -> Services {
    Services {
        fetcher,
        search,
        completion,
        fetch_client: Arc::new(RateLimitedClient::new("fetch", WEB_BACKOFF, DEFAULT_MAX_STRIKES)),
        search_client: Arc::new(RateLimitedClient::new("search", WEB_BACKOFF, DEFAULT_MAX_STRIKES)),
        completion_client: Arc::new(
            RateLimitedClient::new("completion", COMPLETION_BACKOFF, DEFAULT_MAX_STRIKES)
                .with_pacer(TokenPacer::new(Arc::new(ApproximateTokenizer), 500_000, 0.9)),
        ),
    }
}
