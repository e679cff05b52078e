//! The external collaborators of one pipeline run and their rate-limited
//! clients, built once and shared by the enricher and the synthesizer

use std::sync::Arc;
use std::time::Duration;

use crate::client::{ApproximateTokenizer, Cl100kTokenizer, RateLimitedClient, TokenPacer, Tokenizer};
use crate::config::{Config, TokenizerKind};
use crate::providers::{
    ChatCompletionClient, CompletionProvider, DuckDuckGoSearch, HttpPageFetcher, PageFetcher, SearchProvider,
};
use crate::{KgqaError, Result};

#[derive(Clone)]
pub struct Services {
    pub fetcher: Arc<dyn PageFetcher>,
    pub search: Arc<dyn SearchProvider>,
    pub completion: Arc<dyn CompletionProvider>,
    pub fetch_client: Arc<RateLimitedClient>,
    pub search_client: Arc<RateLimitedClient>,
    pub completion_client: Arc<RateLimitedClient>,
}

impl Services {
    /// Live HTTP providers configured from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .completion
            .api_key()
            .map_err(|e| KgqaError::Config(e.to_string()))?;

        let completion = ChatCompletionClient::new(
            config.completion.endpoint.clone(),
            api_key,
            config.completion.model.clone(),
            Duration::from_secs(config.completion.timeout_secs),
        )?;
        let search = DuckDuckGoSearch::new(
            config.search.endpoint.clone(),
            Duration::from_secs(config.search.timeout_secs),
        )?;
        let fetcher = HttpPageFetcher::new(Duration::from_secs(config.fetch.timeout_secs))?;

        let tokenizer: Arc<dyn Tokenizer> = match config.completion.tokenizer {
            TokenizerKind::Cl100k => Arc::new(Cl100kTokenizer::new()?),
            TokenizerKind::Approximate => Arc::new(ApproximateTokenizer),
        };
        let max_strikes = config.breaker.max_strikes;

        Ok(Self {
            fetcher: Arc::new(fetcher),
            search: Arc::new(search),
            completion: Arc::new(completion),
            fetch_client: Arc::new(RateLimitedClient::new(
                "fetch",
                Duration::from_secs(config.fetch.backoff_secs),
                max_strikes,
            )),
            search_client: Arc::new(RateLimitedClient::new(
                "search",
                Duration::from_secs(config.search.backoff_secs),
                max_strikes,
            )),
            completion_client: Arc::new(
                RateLimitedClient::new(
                    "completion",
                    Duration::from_secs(config.completion.backoff_secs),
                    max_strikes,
                )
                .with_pacer(TokenPacer::new(
                    tokenizer,
                    config.completion.tokens_per_minute,
                    config.completion.safety_margin,
                )),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_api_key() {
        let mut config = Config::default();
        config.completion.api_key_env = "KGQA_SERVICES_TEST_MISSING_KEY".to_string();
        config.validate().unwrap();

        let err = Services::from_config(&config).err().unwrap();
        assert!(matches!(err, KgqaError::Config(_)));
    }

    #[test]
    fn test_from_config_builds_clients() {
        let mut config = Config::default();
        config.completion.api_key_env = "KGQA_SERVICES_TEST_KEY".to_string();
        config.completion.tokenizer = TokenizerKind::Approximate;
        std::env::set_var("KGQA_SERVICES_TEST_KEY", "k");

        let services = Services::from_config(&config).unwrap();
        assert_eq!(services.fetch_client.name(), "fetch");
        assert_eq!(services.search_client.name(), "search");
        assert_eq!(services.completion_client.name(), "completion");
        std::env::remove_var("KGQA_SERVICES_TEST_KEY");
    }
}
