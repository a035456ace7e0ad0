//! End-to-end question answering.
//!
//! One function wires the stages together: compliance guardrail, domain
//! routing, retrieval through the external collaborator, synthesis, and
//! cited-source attribution. Retrieval errors propagate; synthesis and
//! attribution never fail outward.

use crate::agent::{ConversationTurn, SynthesisAgent};
use crate::classifier::QuestionRouting;
use crate::guardrails::compliance_refusal;
use crate::sources::{extract_cited_sources, from_scored_chunks, SourceRef};
use crate::standards::ConflictRecord;
use crate::tables::TableHit;
use copilot_core::AppResult;
use copilot_corpus::retrieval::{Retriever, SearchFilters};
use serde::{Deserialize, Serialize};

/// Complete response to one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopilotResponse {
    /// Sanitized answer or a fixed refusal; never empty
    pub answer: String,
    /// Sources the answer drew on; empty only when no evidence existed
    pub cited_sources: Vec<SourceRef>,
    pub tables: Vec<TableHit>,
    pub conflicts: Vec<ConflictRecord>,
    pub num_sources: usize,
}

/// Answer one question against the document corpus.
///
/// # Arguments
/// * `question` - The user question
/// * `history` - Prior conversation turns, oldest first
/// * `retriever` - External retrieval collaborator
/// * `agent` - Synthesis agent with its provider chains
pub async fn answer_question(
    question: &str,
    history: &[ConversationTurn],
    retriever: &dyn Retriever,
    agent: &SynthesisAgent,
) -> AppResult<CopilotResponse> {
    if let Some(refusal) = compliance_refusal(question) {
        return Ok(CopilotResponse {
            answer: refusal.to_string(),
            cited_sources: Vec::new(),
            tables: Vec::new(),
            conflicts: Vec::new(),
            num_sources: 0,
        });
    }

    let routing = QuestionRouting::route(question);
    tracing::info!(
        primary_domain = %routing.primary_domain,
        needs_synthesis = routing.needs_synthesis,
        "Question routed"
    );

    let filters = SearchFilters {
        domains: routing.domains,
    };
    let retrieved = retriever.search(question, &filters).await?;
    tracing::info!(results = retrieved.len(), "Retrieval complete");

    let outcome = agent.synthesize(question, &retrieved, history).await;

    let cited_sources = if outcome.num_sources == 0 {
        Vec::new()
    } else {
        extract_cited_sources(&outcome.synthesis, &from_scored_chunks(&retrieved))
    };

    Ok(CopilotResponse {
        answer: outcome.synthesis,
        cited_sources,
        tables: outcome.tables,
        conflicts: outcome.conflicts,
        num_sources: outcome.num_sources,
    })
}
