//! The synthesis agent: retrieval evidence in, grounded answer out.
//!
//! The agent owns the provider chains and the generation parameters. It
//! never fails outward on provider trouble: when every chain is exhausted
//! it falls back to quoting the best retrieved chunk, and when retrieval
//! found nothing it refuses without calling any provider.

use crate::prompt::build_synthesis_prompt;
use crate::sanitize::{extractive_fallback, sanitize_answer};
use crate::standards::{build_standard_records, detect_conflicts, ConflictRecord, StandardRecord};
use crate::tables::{find_tables, TableHit};
use copilot_core::config::AppConfig;
use copilot_core::AppResult;
use copilot_corpus::retrieval::ScoredChunk;
use copilot_llm::{complete_with_fallback, create_client, default_model_ladder, ProviderChain};
use serde::{Deserialize, Serialize};

/// Token ceiling for synthesis completions.
const SYNTHESIS_MAX_TOKENS: u32 = 3000;
/// Sampling temperature for synthesis completions.
const SYNTHESIS_TEMPERATURE: f32 = 0.3;

/// Returned when retrieval produced no usable evidence.
pub const NO_EVIDENCE_REFUSAL: &str = "I could not find relevant information about this in \
the available safety standards documents. Please try rephrasing your question or ask about \
a topic covered by the loaded documents.";

/// One turn of the running conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Everything synthesis produced for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisOutcome {
    /// Sanitized answer text; never empty
    pub synthesis: String,
    /// Tabular data found in the evidence
    pub tables: Vec<TableHit>,
    /// Flattened records the conflict detector compared
    pub comparisons: Vec<StandardRecord>,
    /// Provenance conflicts among the evidence
    pub conflicts: Vec<ConflictRecord>,
    /// Number of retrieved chunks the synthesis drew on
    pub num_sources: usize,
}

/// Synthesis agent holding the ranked provider chains.
pub struct SynthesisAgent {
    chains: Vec<ProviderChain>,
    max_tokens: u32,
    temperature: f32,
}

impl SynthesisAgent {
    /// Create an agent from explicit provider chains, tried in order.
    pub fn new(chains: Vec<ProviderChain>) -> Self {
        Self {
            chains,
            max_tokens: SYNTHESIS_MAX_TOKENS,
            temperature: SYNTHESIS_TEMPERATURE,
        }
    }

    /// Build the primary and secondary chains from configuration.
    ///
    /// The configured model, when set, is tried before the provider's
    /// default ladder. The fallback provider is optional and skipped when
    /// it cannot be constructed (a missing secondary key is not an error).
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let mut chains = Vec::new();

        let primary = create_client(&config.provider, None, config.api_key.as_deref())?;
        let mut ladder = default_model_ladder(primary.provider_name());
        if let Some(model) = &config.model {
            ladder.retain(|m| m != model);
            ladder.insert(0, model.clone());
        }
        chains.push(ProviderChain::new(primary, ladder));

        if let Some(fallback) = &config.fallback_provider {
            match create_client(fallback, None, config.fallback_api_key.as_deref()) {
                Ok(client) => chains.push(ProviderChain::with_default_models(client)),
                Err(error) => {
                    tracing::warn!(%error, provider = %fallback, "Fallback provider unavailable");
                }
            }
        }

        Ok(Self::new(chains))
    }

    /// Synthesize an answer from retrieved evidence.
    ///
    /// # Arguments
    /// * `question` - The current user question
    /// * `retrieved` - Retrieval results, most-similar first
    /// * `history` - Prior conversation turns, oldest first
    pub async fn synthesize(
        &self,
        question: &str,
        retrieved: &[ScoredChunk],
        history: &[ConversationTurn],
    ) -> SynthesisOutcome {
        if retrieved.is_empty() {
            tracing::info!("No evidence retrieved, refusing without a provider call");
            return SynthesisOutcome {
                synthesis: NO_EVIDENCE_REFUSAL.to_string(),
                tables: Vec::new(),
                comparisons: Vec::new(),
                conflicts: Vec::new(),
                num_sources: 0,
            };
        }

        let tables = find_tables(retrieved);
        let comparisons = build_standard_records(retrieved);
        let conflicts = detect_conflicts(&comparisons);

        let recent_questions: Vec<String> = history
            .iter()
            .filter(|turn| turn.role == TurnRole::User)
            .map(|turn| turn.content.clone())
            .collect();

        let prompt =
            build_synthesis_prompt(question, retrieved, &tables, &conflicts, &recent_questions);

        tracing::debug!(
            sources = retrieved.len(),
            tables = tables.len(),
            conflicts = conflicts.len(),
            "Synthesis prompt assembled"
        );

        let raw = complete_with_fallback(&self.chains, &prompt, self.max_tokens, self.temperature)
            .await;

        // Sanitization applies to whatever text resulted, model or fallback
        let raw = match raw {
            Some(text) => text,
            None => {
                tracing::warn!("All provider chains exhausted, using extractive fallback");
                extractive_fallback(&retrieved[0])
            }
        };
        let synthesis = sanitize_answer(&raw);

        SynthesisOutcome {
            synthesis,
            tables,
            comparisons,
            conflicts,
            num_sources: retrieved.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::{AppError, AppResult};
    use copilot_corpus::chunk::{DocumentChunk, DocumentTags};
    use copilot_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns one canned result for every model and counts invocations.
    struct CannedClient {
        result: Result<String, String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl LlmClient for CannedClient {
        fn provider_name(&self) -> &str {
            "anthropic"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(text) => Ok(LlmResponse {
                    content: text.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::default(),
                }),
                Err(message) => Err(AppError::Llm(message.clone())),
            }
        }
    }

    fn agent_with(result: Result<&str, &str>) -> (SynthesisAgent, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = Arc::new(CannedClient {
            result: result.map(str::to_string).map_err(str::to_string),
            calls: calls.clone(),
        });
        let chain = ProviderChain::new(client, vec!["m".to_string()]);
        (SynthesisAgent::new(vec![chain]), calls)
    }

    fn evidence(text: &str) -> Vec<ScoredChunk> {
        vec![ScoredChunk {
            chunk: DocumentChunk {
                text: text.to_string(),
                document_name: "unece_r94_1995".to_string(),
                page_number: 12,
                section_number: Some("5.2".to_string()),
                chunk_id: DocumentChunk::make_id("unece_r94_1995", 12, 0),
                tags: DocumentTags::default(),
            },
            similarity: 0.8,
        }]
    }

    #[tokio::test]
    async fn test_empty_retrieval_refuses_without_provider_call() {
        let (agent, calls) = agent_with(Ok("never used"));
        let outcome = agent.synthesize("What is HIC?", &[], &[]).await;
        assert_eq!(outcome.synthesis, NO_EVIDENCE_REFUSAL);
        assert_eq!(outcome.num_sources, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_synthesis_is_sanitized() {
        let (agent, calls) = agent_with(Ok(
            "The head injury criterion limit is 1000 for the frontal test [Document: r94, Page 12].",
        ));
        let outcome = agent
            .synthesize(
                "What is the HIC limit?",
                &evidence("The HIC shall not exceed 1000."),
                &[],
            )
            .await;
        assert!(outcome.synthesis.contains("limit is 1000"));
        assert!(!outcome.synthesis.contains("[Document"));
        assert_eq!(outcome.num_sources, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_uses_extractive_fallback() {
        let (agent, _) = agent_with(Err("500 internal server error"));
        let outcome = agent
            .synthesize(
                "What is the HIC limit?",
                &evidence("The head injury criterion shall not exceed 1000 in the frontal test."),
                &[],
            )
            .await;
        assert!(outcome.synthesis.contains("raw text"));
        assert!(outcome.synthesis.contains("head injury criterion"));
        // provenance belongs in the cited-sources list, not the answer body
        assert!(!outcome.synthesis.contains("unece_r94_1995"));
    }

    #[tokio::test]
    async fn test_extractive_fallback_is_sanitized() {
        let (agent, _) = agent_with(Err("500 internal server error"));
        let outcome = agent
            .synthesize(
                "What is the chest deflection limit?",
                &evidence(
                    "The chest deflection limit shall not exceed 42 mm (see Page 12) during the test.",
                ),
                &[],
            )
            .await;
        assert!(outcome.synthesis.contains("42 mm"));
        assert!(!outcome.synthesis.contains("Page 12"));
    }

    #[tokio::test]
    async fn test_outcome_carries_tables_and_conflicts() {
        let (agent, _) = agent_with(Ok("The chest deflection limit is 42 mm in both documents."));
        let mut retrieved = evidence("| Criterion | Limit |\n|---|---|\n| HIC36 | 1000 |");
        let mut second = retrieved[0].clone();
        second.chunk.document_name = "industry_note".to_string();
        second.chunk.chunk_id = DocumentChunk::make_id("industry_note", 1, 0);
        second.chunk.tags.origin = Some("Industry".to_string());
        retrieved[0].chunk.tags.origin = Some("UNECE".to_string());
        retrieved.push(second);

        let outcome = agent.synthesize("Compare the limits", &retrieved, &[]).await;
        assert_eq!(outcome.num_sources, 2);
        assert_eq!(outcome.tables.len(), 2);
        assert_eq!(outcome.comparisons.len(), 2);
        assert_eq!(outcome.conflicts.len(), 1);
    }
}
