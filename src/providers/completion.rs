use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::CompletionProvider;
use crate::error::{KgqaError, Result};

/// Default OpenAI-compatible endpoint (Mistral La Plateforme)
pub const DEFAULT_COMPLETION_ENDPOINT: &str = "https://api.mistral.ai/v1";

/// Default chat model
pub const DEFAULT_COMPLETION_MODEL: &str = "mistral-large-latest";

/// Request structure for the chat completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response structure from the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client for OpenAI-compatible APIs
///
/// Sends the prompt as a single user message. Retry and pacing live in
/// [`crate::client::RateLimitedClient`], not here.
pub struct ChatCompletionClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionClient {
    /// Create a new completion client
    ///
    /// # Arguments
    ///
    /// * `endpoint` - API base URL, without the `/chat/completions` suffix
    /// * `api_key` - Bearer token
    /// * `model` - Model name (e.g., "mistral-large-latest")
    /// * `timeout` - Per-request timeout
    pub fn new(endpoint: impl Into<String>, api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KgqaError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| KgqaError::Completion(format!("Network error: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(KgqaError::Completion(format!("API error {}: {}", status, body)));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| KgqaError::Completion(format!("Failed to parse response: {}", e)))?;

        log::debug!("Completion call took {:?}", start.elapsed());

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| KgqaError::Completion("Empty response from completion API".to_string()))
    }
}
