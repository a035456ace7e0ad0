//! Standard comparison records and conflict detection.
//!
//! Retrieved chunks are projected into flat records keyed by document
//! metadata, then grouped by (domain, method). A group drawing on more
//! than one origin or strictness level is flagged as a potential conflict.
//! Detection is intentionally recall-biased: differing provenance within
//! one standard key is enough, with no semantic comparison of the text.

use copilot_corpus::retrieval::ScoredChunk;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const UNKNOWN: &str = "Unknown";

/// One retrieved chunk flattened for comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardRecord {
    pub document: String,
    pub origin: Option<String>,
    pub method: Option<String>,
    pub domain: Option<String>,
    pub strictness: Option<String>,
    pub year: Option<u16>,
    pub text: String,
    pub page: u32,
    pub section: Option<String>,
    pub similarity: f32,
}

/// A (domain, method) group whose sources disagree in provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Grouping key, "{domain}_{method}" with "Unknown" for missing parts
    pub standard_key: String,
    /// Documents contributing to the group, first-seen order
    pub sources: Vec<String>,
    pub conflict_type: String,
}

/// Project retrieved chunks into comparison records.
pub fn build_standard_records(retrieved: &[ScoredChunk]) -> Vec<StandardRecord> {
    retrieved
        .iter()
        .map(|scored| StandardRecord {
            document: scored.chunk.document_name.clone(),
            origin: scored.chunk.tags.origin.clone(),
            method: scored.chunk.tags.method.clone(),
            domain: scored.chunk.tags.domain.clone(),
            strictness: scored.chunk.tags.strictness.clone(),
            year: scored.chunk.tags.year,
            text: scored.chunk.text.clone(),
            page: scored.chunk.page_number,
            section: scored.chunk.section_number.clone(),
            similarity: scored.similarity,
        })
        .collect()
}

fn standard_key(record: &StandardRecord) -> String {
    format!(
        "{}_{}",
        record.domain.as_deref().unwrap_or(UNKNOWN),
        record.method.as_deref().unwrap_or(UNKNOWN)
    )
}

fn distinct_count(values: impl Iterator<Item = Option<String>>) -> usize {
    let mut seen: Vec<Option<String>> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.len()
}

/// Detect provenance conflicts among records covering the same standard.
///
/// Records are grouped by standard key; a group with more than one record
/// conflicts when it spans multiple origins or multiple strictness levels.
/// Group order follows first appearance in the input, so output is
/// deterministic for a given retrieval.
pub fn detect_conflicts(records: &[StandardRecord]) -> Vec<ConflictRecord> {
    let mut key_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&StandardRecord>> = HashMap::new();

    for record in records {
        let key = standard_key(record);
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                key_order.push(key.clone());
                Vec::new()
            })
            .push(record);
    }

    let mut conflicts = Vec::new();
    for key in key_order {
        let group = &groups[&key];
        if group.len() < 2 {
            continue;
        }
        let origins = distinct_count(group.iter().map(|r| r.origin.clone()));
        let strictness = distinct_count(group.iter().map(|r| r.strictness.clone()));
        if origins > 1 || strictness > 1 {
            let mut sources: Vec<String> = Vec::new();
            for record in group {
                if !sources.contains(&record.document) {
                    sources.push(record.document.clone());
                }
            }
            conflicts.push(ConflictRecord {
                standard_key: key,
                sources,
                conflict_type: "multiple_interpretations".to_string(),
            });
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_corpus::chunk::{DocumentChunk, DocumentTags};

    fn scored(document: &str, origin: &str, strictness: &str, method: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: DocumentChunk {
                text: "requirement text".to_string(),
                document_name: document.to_string(),
                page_number: 1,
                section_number: None,
                chunk_id: DocumentChunk::make_id(document, 1, 0),
                tags: DocumentTags {
                    origin: Some(origin.to_string()),
                    domain: Some("Passive Safety".to_string()),
                    strictness: Some(strictness.to_string()),
                    method: Some(method.to_string()),
                    ..DocumentTags::default()
                },
            },
            similarity: 0.7,
        }
    }

    #[test]
    fn test_records_carry_metadata() {
        let records = build_standard_records(&[scored("r94", "UNECE", "Regulatory", "UNECE R94")]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin.as_deref(), Some("UNECE"));
        assert_eq!(records[0].method.as_deref(), Some("UNECE R94"));
    }

    #[test]
    fn test_differing_origins_flag_conflict() {
        let records = build_standard_records(&[
            scored("r94_unece", "UNECE", "Regulatory", "UNECE R94"),
            scored("r94_industry_note", "Industry", "Regulatory", "UNECE R94"),
        ]);
        let conflicts = detect_conflicts(&records);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].standard_key, "Passive Safety_UNECE R94");
        assert_eq!(conflicts[0].sources, vec!["r94_unece", "r94_industry_note"]);
        assert_eq!(conflicts[0].conflict_type, "multiple_interpretations");
    }

    #[test]
    fn test_same_provenance_is_not_a_conflict() {
        let records = build_standard_records(&[
            scored("r94_part1", "UNECE", "Regulatory", "UNECE R94"),
            scored("r94_part2", "UNECE", "Regulatory", "UNECE R94"),
        ]);
        assert!(detect_conflicts(&records).is_empty());
    }

    #[test]
    fn test_single_record_group_is_ignored() {
        let records = build_standard_records(&[scored("r94", "UNECE", "Regulatory", "UNECE R94")]);
        assert!(detect_conflicts(&records).is_empty());
    }

    #[test]
    fn test_missing_metadata_groups_under_unknown() {
        let mut a = scored("doc_a", "UNECE", "Regulatory", "x");
        a.chunk.tags.domain = None;
        a.chunk.tags.method = None;
        let mut b = scored("doc_b", "Industry", "Standard", "x");
        b.chunk.tags.domain = None;
        b.chunk.tags.method = None;
        let conflicts = detect_conflicts(&build_standard_records(&[a, b]));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].standard_key, "Unknown_Unknown");
    }
}
