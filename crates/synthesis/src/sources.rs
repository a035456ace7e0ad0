//! Cited-source attribution for synthesized answers.
//!
//! The prompt forbids inline citation markers, so attribution is recovered
//! after the fact: a retrieved source counts as cited when the answer
//! names its document, mentions its page or section, or the source scored
//! high enough that it almost certainly shaped the answer. The cited list
//! is never empty while sources exist.

use copilot_corpus::retrieval::ScoredChunk;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Sources at or above this similarity are always treated as cited.
const ALWAYS_CITED_SIMILARITY: f32 = 0.6;
/// Fallback attribution keeps this many top sources.
const FALLBACK_TOP_SOURCES: usize = 3;

static PAGE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:page|pg\.?|p\.?)\s*(\d+)\b").expect("page ref regex is valid")
});

static SECTION_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bsec(?:tion)?\.?\s+([0-9][0-9.]*)\b").expect("section ref regex is valid")
});

static DOC_PAGE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)document[:\s]+([^,]+?)[,\s]+page[:\s]+(\d+)",
        r"(?i)([^,]+?)[,\s]+page[:\s]+(\d+)",
        r"(?i)([^(]+?)\s*\([^)]*page[:\s]*(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("doc-page regex is valid"))
    .collect()
});

/// A source attributed to an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub document_name: String,
    pub page_number: u32,
    pub section_number: Option<String>,
    pub similarity: f32,
}

impl SourceRef {
    fn from_scored(scored: &ScoredChunk) -> Self {
        Self {
            document_name: scored.chunk.document_name.clone(),
            page_number: scored.chunk.page_number,
            section_number: scored.chunk.section_number.clone(),
            similarity: scored.similarity,
        }
    }
}

/// Project retrieved chunks into source references, order preserved.
pub fn from_scored_chunks(retrieved: &[ScoredChunk]) -> Vec<SourceRef> {
    retrieved.iter().map(SourceRef::from_scored).collect()
}

/// Whether the answer names this document.
///
/// Matches on the full document stem or, for long stems, on the stem's
/// first three underscore-separated words (each longer than three chars).
fn answer_names_document(answer_lower: &str, document_name: &str) -> bool {
    let stem_lower = document_name.to_lowercase();
    if answer_lower.contains(&stem_lower) {
        return true;
    }
    stem_lower
        .split(['_', '-', ' '])
        .filter(|word| word.chars().count() > 3)
        .take(3)
        .any(|word| answer_lower.contains(word))
}

/// Page numbers the answer mentions.
fn mentioned_pages(answer: &str) -> HashSet<u32> {
    PAGE_REF_RE
        .captures_iter(answer)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .collect()
}

/// Section identifiers the answer mentions.
fn mentioned_sections(answer: &str) -> HashSet<String> {
    SECTION_REF_RE
        .captures_iter(answer)
        .map(|caps| caps[1].trim_end_matches('.').to_string())
        .collect()
}

/// Determine which retrieved sources the answer actually drew on.
///
/// A source is kept when the answer names its document, mentions its page
/// or section, or its similarity reaches the always-cited floor. Results
/// are deduplicated by (document, page). When nothing matches, the top
/// sources by similarity are returned so attribution is never empty.
pub fn extract_cited_sources(answer: &str, all_sources: &[SourceRef]) -> Vec<SourceRef> {
    if all_sources.is_empty() {
        return Vec::new();
    }

    let answer_lower = answer.to_lowercase();
    let pages = mentioned_pages(answer);
    let sections = mentioned_sections(answer);

    let mut seen: HashSet<(String, u32)> = HashSet::new();
    let mut cited: Vec<SourceRef> = Vec::new();

    for source in all_sources {
        let named = answer_names_document(&answer_lower, &source.document_name);
        let page_hit = pages.contains(&source.page_number);
        let section_hit = source
            .section_number
            .as_ref()
            .map(|s| sections.contains(s.trim_end_matches('.')))
            .unwrap_or(false);
        let high_similarity = source.similarity >= ALWAYS_CITED_SIMILARITY;

        if (named || page_hit || section_hit || high_similarity)
            && seen.insert((source.document_name.clone(), source.page_number))
        {
            cited.push(source.clone());
        }
    }

    if cited.is_empty() {
        let mut ranked: Vec<SourceRef> = all_sources.to_vec();
        ranked.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for source in ranked {
            if seen.insert((source.document_name.clone(), source.page_number)) {
                cited.push(source);
            }
            if cited.len() == FALLBACK_TOP_SOURCES {
                break;
            }
        }
    }
    cited
}

/// Parse explicit "document, page N" references out of free text.
///
/// Used against answers from older prompt revisions that still emit
/// inline citations; ordered from most to least specific pattern.
pub fn extract_source_references(text: &str) -> HashSet<(String, u32)> {
    let mut refs = HashSet::new();
    for re in DOC_PAGE_RES.iter() {
        for caps in re.captures_iter(text) {
            let document = caps[1].trim().trim_matches(['[', ']', '(', ')']).to_string();
            if document.is_empty() {
                continue;
            }
            if let Ok(page) = caps[2].parse::<u32>() {
                refs.insert((document, page));
            }
        }
    }
    refs
}
