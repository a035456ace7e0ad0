//! Anthropic Messages API provider.
//!
//! API reference: https://docs.anthropic.com/en/api/messages

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage, DEFAULT_TIMEOUT_SECS};
use copilot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicContent>,
    #[serde(default)]
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Anthropic LLM client.
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a new Anthropic client.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a new Anthropic client with a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn to_api_request(&self, request: &LlmRequest) -> AnthropicRequest {
        AnthropicRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(1024),
            temperature: request.temperature,
            system: request.system.clone(),
            messages: vec![AnthropicMessage {
                role: "user",
                content: request.prompt.clone(),
            }],
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending completion request to Anthropic");

        let url = format!("{}/v1/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .json(&self.to_api_request(request))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Anthropic: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Anthropic response: {}", e)))?;

        let content = api_response
            .content
            .first()
            .map(|block| block.text.trim().to_string())
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: api_response.model,
            usage: LlmUsage::new(
                api_response.usage.input_tokens,
                api_response.usage.output_tokens,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_mapping() {
        let client = AnthropicClient::new("key");
        let request = LlmRequest::new("prompt", "claude-3-5-sonnet-20241022")
            .with_max_tokens(3000)
            .with_temperature(0.3);
        let api = client.to_api_request(&request);
        assert_eq!(api.model, "claude-3-5-sonnet-20241022");
        assert_eq!(api.max_tokens, 3000);
        assert_eq!(api.messages.len(), 1);
        assert_eq!(api.messages[0].role, "user");
    }
}
