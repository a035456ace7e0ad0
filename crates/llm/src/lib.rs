//! LLM integration crate for Safety Copilot.
//!
//! Provides a provider-agnostic abstraction for Large Language Models with
//! a unified trait-based interface, plus the ranked provider/model fallback
//! chain used by the synthesis agent.
//!
//! # Providers
//! - **Anthropic**: default primary provider
//! - **OpenAI**: default secondary provider
//! - **Ollama**: local, keyless operation

pub mod client;
pub mod factory;
pub mod fallback;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use fallback::{
    classify_provider_error, complete_with_fallback, default_model_ladder, AttemptOutcome,
    ProviderChain, ProviderErrorClass,
};
pub use providers::{AnthropicClient, OllamaClient, OpenAiClient};
