//! Retrieval collaborator contract.
//!
//! Vector-index construction and nearest-neighbor search live outside this
//! workspace; the synthesis pipeline only depends on this trait. An
//! implementation returns chunks most-similar first, already filtered by
//! its similarity threshold and capped at its top-K.

use async_trait::async_trait;
use copilot_core::AppResult;
use serde::{Deserialize, Serialize};

use crate::chunk::DocumentChunk;

/// A retrieved chunk with its similarity score in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub similarity: f32,
}

/// Optional retrieval filters derived from question classification.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Restrict results to these domains, most relevant first; empty means
    /// no domain restriction.
    pub domains: Vec<String>,
}

/// External retrieval collaborator.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve chunks relevant to a question, most-similar first.
    async fn search(&self, question: &str, filters: &SearchFilters)
        -> AppResult<Vec<ScoredChunk>>;
}
