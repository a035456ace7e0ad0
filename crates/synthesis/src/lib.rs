//! Synthesis crate for Safety Copilot.
//!
//! Turns retrieval evidence into grounded, attributed answers: question
//! routing, tabular-data and conflict detection, prompt assembly, ranked
//! provider fallback (via `copilot-llm`), answer sanitization, and
//! cited-source attribution, wired together by the question pipeline.

pub mod agent;
pub mod classifier;
pub mod guardrails;
pub mod pipeline;
pub mod prompt;
pub mod sanitize;
pub mod sources;
pub mod standards;
pub mod tables;

// Re-export main types
pub use agent::{ConversationTurn, SynthesisAgent, SynthesisOutcome, TurnRole};
pub use classifier::QuestionRouting;
pub use pipeline::{answer_question, CopilotResponse};
pub use sources::SourceRef;
pub use standards::{ConflictRecord, StandardRecord};
pub use tables::{TableData, TableHit, TableKind};
