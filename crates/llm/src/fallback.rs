//! Ranked provider/model fallback.
//!
//! A provider chain is an ordered list of model identifiers tried against
//! one client. Each attempt resolves to an explicit outcome: success stops
//! the chain, a missing model or transient error skips to the next model,
//! and an authentication or rate-limit error aborts the whole provider.
//! When the primary chain yields nothing the same strategy runs against
//! the secondary provider. Provider errors never escape this module; the
//! caller sees `Some(text)` or `None`.

use crate::client::{LlmClient, LlmRequest};
use copilot_core::AppError;
use std::sync::Arc;

/// Default Anthropic model ladder, in priority order.
pub const ANTHROPIC_MODEL_LADDER: &[&str] = &[
    "claude-3-5-sonnet-20241022",
    "claude-3-5-sonnet-20240620",
    "claude-3-opus-20240229",
    "claude-3-sonnet-20240229",
];

/// Default OpenAI model ladder, in priority order.
pub const OPENAI_MODEL_LADDER: &[&str] = &["gpt-4-turbo-preview", "gpt-4-1106-preview", "gpt-4"];

/// Default Ollama model ladder.
pub const OLLAMA_MODEL_LADDER: &[&str] = &["llama3.2", "llama3"];

/// Outcome of one model attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Non-empty completion text was produced
    Success(String),
    /// Try the next model in the ladder
    SkipModel,
    /// Stop trying models on this provider entirely
    AbortProvider,
}

/// Classification of a provider error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorClass {
    /// Model identifier not recognized by the provider
    ModelNotFound,
    /// Credentials rejected
    Auth,
    /// Quota or rate limit hit
    RateLimited,
    /// Anything else (network, 5xx, parse failures)
    Other,
}

/// Classify a provider error by inspecting its message.
pub fn classify_provider_error(error: &AppError) -> ProviderErrorClass {
    let message = error.to_string().to_lowercase();
    if message.contains("404") || message.contains("not_found") || message.contains("not found") {
        ProviderErrorClass::ModelNotFound
    } else if message.contains("401")
        || message.contains("403")
        || message.contains("authentication")
        || message.contains("unauthorized")
        || message.contains("api_key")
        || message.contains("api key")
    {
        ProviderErrorClass::Auth
    } else if message.contains("429")
        || message.contains("rate_limit")
        || message.contains("rate limit")
    {
        ProviderErrorClass::RateLimited
    } else {
        ProviderErrorClass::Other
    }
}

/// Map one completion attempt to an outcome.
fn outcome_for_attempt(
    result: copilot_core::AppResult<crate::client::LlmResponse>,
    provider: &str,
    model: &str,
) -> AttemptOutcome {
    match result {
        Ok(response) => {
            let text = response.content.trim().to_string();
            if text.is_empty() {
                tracing::warn!(provider, model, "Empty completion, trying next model");
                AttemptOutcome::SkipModel
            } else {
                tracing::info!(provider, model, chars = text.len(), "Completion accepted");
                AttemptOutcome::Success(text)
            }
        }
        Err(error) => match classify_provider_error(&error) {
            ProviderErrorClass::ModelNotFound => {
                tracing::warn!(provider, model, %error, "Model not found, trying next");
                AttemptOutcome::SkipModel
            }
            ProviderErrorClass::Auth => {
                tracing::error!(provider, model, %error, "Authentication error, aborting provider");
                AttemptOutcome::AbortProvider
            }
            ProviderErrorClass::RateLimited => {
                tracing::warn!(provider, model, %error, "Rate limited, aborting provider");
                AttemptOutcome::AbortProvider
            }
            ProviderErrorClass::Other => {
                tracing::warn!(provider, model, %error, "Provider error, trying next model");
                AttemptOutcome::SkipModel
            }
        },
    }
}

/// One provider with its ordered model ladder.
pub struct ProviderChain {
    client: Arc<dyn LlmClient>,
    models: Vec<String>,
}

impl ProviderChain {
    /// Create a chain from a client and an explicit model ladder.
    pub fn new(client: Arc<dyn LlmClient>, models: Vec<String>) -> Self {
        Self { client, models }
    }

    /// Create a chain using the default ladder for the client's provider.
    pub fn with_default_models(client: Arc<dyn LlmClient>) -> Self {
        let ladder = default_model_ladder(client.provider_name());
        Self::new(client, ladder)
    }

    /// The provider name behind this chain.
    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Run the ladder: first non-empty completion wins.
    pub async fn run(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Option<String> {
        let provider = self.client.provider_name().to_string();
        for model in &self.models {
            let request = LlmRequest::new(prompt, model.clone())
                .with_max_tokens(max_tokens)
                .with_temperature(temperature);
            match outcome_for_attempt(self.client.complete(&request).await, &provider, model) {
                AttemptOutcome::Success(text) => return Some(text),
                AttemptOutcome::SkipModel => continue,
                AttemptOutcome::AbortProvider => return None,
            }
        }
        None
    }
}

/// Default model ladder for a provider name.
pub fn default_model_ladder(provider: &str) -> Vec<String> {
    let ladder = match provider {
        "anthropic" => ANTHROPIC_MODEL_LADDER,
        "openai" => OPENAI_MODEL_LADDER,
        "ollama" => OLLAMA_MODEL_LADDER,
        _ => &[][..],
    };
    ladder.iter().map(|m| m.to_string()).collect()
}

/// Run chains in order until one produces text.
pub async fn complete_with_fallback(
    chains: &[ProviderChain],
    prompt: &str,
    max_tokens: u32,
    temperature: f32,
) -> Option<String> {
    for chain in chains {
        tracing::info!(provider = chain.provider_name(), "Attempting synthesis");
        if let Some(text) = chain.run(prompt, max_tokens, temperature).await {
            return Some(text);
        }
        tracing::warn!(
            provider = chain.provider_name(),
            "Provider chain exhausted without output"
        );
    }
    None
}
