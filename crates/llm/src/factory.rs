//! LLM provider factory.
//!
//! Creates client handles from application configuration. Clients are
//! constructed once per process and passed into the synthesis component;
//! there is no ambient global provider state.

use crate::client::LlmClient;
use crate::providers::{AnthropicClient, OllamaClient, OpenAiClient};
use copilot_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("anthropic", "openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for providers that need one)
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "anthropic" | "claude" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("Anthropic provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(url) => AnthropicClient::with_base_url(key, url),
                None => AnthropicClient::new(key),
            };
            Ok(Arc::new(client))
        }
        "openai" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(url) => OpenAiClient::with_base_url(key, url),
                None => OpenAiClient::new(key),
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url),
                None => OllamaClient::new(),
            };
            Ok(Arc::new(client))
        }
        other => Err(AppError::Config(format!("Unknown provider: {}", other))),
    }
}
