//! Retry, circuit-breaker and pacing discipline for outbound calls
//!
//! One [`RateLimitedClient`] exists per external dependency (search, page
//! fetch, completion) for the whole run, so strike counters are shared by all
//! callers of that dependency.

mod breaker;
mod pacing;

pub use breaker::{CircuitBreaker, RateBudget, DEFAULT_MAX_STRIKES};
pub use pacing::{pacing_delay_secs, ApproximateTokenizer, Cl100kTokenizer, TokenPacer, Tokenizer};

use std::future::Future;
use std::time::Duration;

use crate::providers::CompletionProvider;
use crate::Result;

/// Backoff before the single retry of a search or fetch
pub const WEB_BACKOFF: Duration = Duration::from_secs(2);

/// Backoff before the single retry of a completion call
pub const COMPLETION_BACKOFF: Duration = Duration::from_secs(60);

/// Wrapper enforcing retry-once, a consecutive-failure breaker and optional
/// token pacing around any outbound call
#[derive(Debug)]
pub struct RateLimitedClient {
    breaker: CircuitBreaker,
    backoff: Duration,
    pacer: Option<TokenPacer>,
}

impl RateLimitedClient {
    pub fn new(name: impl Into<String>, backoff: Duration, max_strikes: u32) -> Self {
        Self {
            breaker: CircuitBreaker::new(name, max_strikes),
            backoff,
            pacer: None,
        }
    }

    /// Enable token-budget pacing (completion clients)
    pub fn with_pacer(mut self, pacer: TokenPacer) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn name(&self) -> &str {
        self.breaker.name()
    }

    pub fn budget(&self) -> RateBudget {
        self.breaker.budget()
    }

    /// Run `op`, retrying once after the backoff on a non-fatal failure
    ///
    /// A call whose retry also fails is one strike. The call that pushes the
    /// streak past the threshold returns `CircuitOpen` instead of its error.
    pub async fn call<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.breaker.check()?;

        let err = match op().await {
            Ok(value) => {
                self.breaker.record_success();
                return Ok(value);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => e,
        };

        log::warn!(
            "{} call failed ({}), retrying in {:.0?}",
            self.name(),
            err,
            self.backoff
        );
        tokio::time::sleep(self.backoff).await;

        match op().await {
            Ok(value) => {
                self.breaker.record_success();
                Ok(value)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                self.breaker.record_failure()?;
                Err(e)
            }
        }
    }

    /// One completion call with retry, then the pacing delay for its prompt
    pub async fn complete(&self, provider: &dyn CompletionProvider, prompt: &str) -> Result<String> {
        let result = self.call(|| provider.complete(prompt)).await;

        // no pacing once the breaker has opened
        let fatal = matches!(&result, Err(e) if e.is_fatal());
        if let Some(pacer) = self.pacer.as_ref().filter(|_| !fatal) {
            let (tokens, delay) = pacer.delay_for(prompt);
            log::info!(
                "Estimated tokens: {}, applying delay of {:.2} seconds",
                tokens,
                delay.as_secs_f64()
            );
            tokio::time::sleep(delay).await;
        }

        result.map(|text| text.trim().to_string())
    }
}
