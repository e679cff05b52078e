//! Token-budget pacing for the completion provider

use std::sync::Arc;
use std::time::Duration;

use tiktoken_rs::CoreBPE;

use crate::{KgqaError, Result};

/// Estimates how many tokens a prompt costs
pub trait Tokenizer: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

/// Exact counts with tiktoken's cl100k_base encoding
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| KgqaError::Tokenizer(format!("failed to load cl100k_base: {}", e)))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

/// Rough estimate: 1 token ≈ 4 characters
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproximateTokenizer;

impl Tokenizer for ApproximateTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        (text.len() + 3) / 4
    }
}

/// Seconds to wait after sending `tokens` so the per-minute allowance holds
///
/// `max(1.0, 60 * tokens / (tokens_per_minute * safety_margin))`
pub fn pacing_delay_secs(tokens: usize, tokens_per_minute: u64, safety_margin: f64) -> f64 {
    let allowance = tokens_per_minute as f64 * safety_margin;
    if allowance <= 0.0 {
        return 60.0;
    }
    (60.0 * tokens as f64 / allowance).max(1.0)
}

/// Computes the cooperative delay after each completion call
#[derive(Clone)]
pub struct TokenPacer {
    tokenizer: Arc<dyn Tokenizer>,
    tokens_per_minute: u64,
    safety_margin: f64,
}

impl std::fmt::Debug for TokenPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPacer")
            .field("tokens_per_minute", &self.tokens_per_minute)
            .field("safety_margin", &self.safety_margin)
            .finish()
    }
}

impl TokenPacer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, tokens_per_minute: u64, safety_margin: f64) -> Self {
        Self {
            tokenizer,
            tokens_per_minute,
            safety_margin,
        }
    }

    /// Estimated tokens and resulting delay for `prompt`
    pub fn delay_for(&self, prompt: &str) -> (usize, Duration) {
        let tokens = self.tokenizer.count_tokens(prompt);
        let secs = pacing_delay_secs(tokens, self.tokens_per_minute, self.safety_margin);
        (tokens, Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCount(usize);

    impl Tokenizer for FixedCount {
        fn count_tokens(&self, _text: &str) -> usize {
            self.0
        }
    }

    #[test]
    fn test_delay_arithmetic() {
        let delay = pacing_delay_secs(500_000, 500_000, 0.9);
        assert!((delay - 66.666_666).abs() < 0.001, "delay was {}", delay);
    }

    #[test]
    fn test_delay_floor_is_one_second() {
        assert_eq!(pacing_delay_secs(0, 500_000, 0.9), 1.0);
        assert_eq!(pacing_delay_secs(1_000, 500_000, 0.9), 1.0);
    }

    #[test]
    fn test_pacer_uses_tokenizer() {
        let pacer = TokenPacer::new(Arc::new(FixedCount(900_000)), 500_000, 0.9);
        let (tokens, delay) = pacer.delay_for("anything");
        assert_eq!(tokens, 900_000);
        assert_eq!(delay.as_secs(), 120);
    }

    #[test]
    fn test_approximate_tokenizer() {
        assert_eq!(ApproximateTokenizer.count_tokens("test"), 1);
        assert_eq!(ApproximateTokenizer.count_tokens("testtest12"), 3);
        assert_eq!(ApproximateTokenizer.count_tokens(""), 0);
    }

    #[test]
    fn test_cl100k_counts_words() {
        let tokenizer = Cl100kTokenizer::new().unwrap();
        let tokens = tokenizer.count_tokens("Metformin treats type 2 diabetes.");
        assert!(tokens > 3 && tokens < 20, "tokens was {}", tokens);
    }
}
