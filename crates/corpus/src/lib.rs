//! Document corpus crate for Safety Copilot.
//!
//! Converts a tree of safety-standard PDFs into addressable, attributable
//! chunks: page extraction with a two-extractor fallback, path-driven
//! metadata inference, text cleaning, section-number extraction, and
//! sliding-window chunking with proportional overlap. Also defines the
//! retrieval collaborator contract consumed by the synthesis pipeline.

pub mod chunk;
pub mod chunker;
pub mod metadata;
pub mod pdf;
pub mod processor;
pub mod retrieval;
pub mod section;
pub mod text;

// Re-export main types
pub use chunk::{DocumentChunk, DocumentTags};
pub use chunker::chunk_page;
pub use metadata::extract_tags_from_path;
pub use processor::DocumentProcessor;
pub use retrieval::{Retriever, ScoredChunk, SearchFilters};
pub use section::extract_section_number;
