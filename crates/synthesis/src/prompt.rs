//! Synthesis prompt assembly.
//!
//! The prompt carries every retrieved chunk under a provenance header, a
//! summary of any tabular data and provenance conflicts, a short window of
//! prior questions, and the grounding instructions the model must follow.

use crate::standards::ConflictRecord;
use crate::tables::TableHit;
use copilot_corpus::retrieval::ScoredChunk;

/// Prior questions carried into the prompt, newest last.
const HISTORY_WINDOW: usize = 5;

/// Provenance header for one chunk, e.g.
/// `[unece_r94_1995, UNECE, UNECE R94, Page 12, Section 5.2.1]`.
fn provenance_header(scored: &ScoredChunk) -> String {
    let chunk = &scored.chunk;
    let mut parts = vec![chunk.document_name.clone()];
    if let Some(origin) = &chunk.tags.origin {
        parts.push(origin.clone());
    }
    if let Some(method) = &chunk.tags.method {
        parts.push(method.clone());
    }
    parts.push(format!("Page {}", chunk.page_number));
    if let Some(section) = &chunk.section_number {
        parts.push(format!("Section {}", section));
    }
    format!("[{}]", parts.join(", "))
}

fn context_block(retrieved: &[ScoredChunk]) -> String {
    retrieved
        .iter()
        .map(|scored| format!("{}\n{}", provenance_header(scored), scored.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn tables_block(tables: &[TableHit]) -> String {
    if tables.is_empty() {
        return String::new();
    }
    let mut lines = vec![format!(
        "Tabular data was detected in {} of the excerpts:",
        tables.len()
    )];
    for hit in tables {
        let location = match &hit.section {
            Some(section) => format!("{}, page {}, section {}", hit.document, hit.page, section),
            None => format!("{}, page {}", hit.document, hit.page),
        };
        match &hit.table {
            Some(table) => lines.push(format!(
                "- {}: columns [{}], {} rows",
                location,
                table.headers.join(", "),
                table.rows.len()
            )),
            None => lines.push(format!("- {}: structure could not be rebuilt; raw excerpt follows:\n  {}", location, hit.excerpt)),
        }
    }
    lines.push("Present numeric limits and thresholds exactly as stated, in a table when the question calls for one.".to_string());
    format!("\n\n{}", lines.join("\n"))
}

fn conflicts_block(conflicts: &[ConflictRecord]) -> String {
    if conflicts.is_empty() {
        return String::new();
    }
    let mut lines =
        vec!["The excerpts cover the same standard from sources that may disagree:".to_string()];
    for conflict in conflicts {
        lines.push(format!(
            "- {}: {}",
            conflict.standard_key,
            conflict.sources.join(", ")
        ));
    }
    lines.push(
        "Where these sources state different requirements, present each position with its source rather than merging them.".to_string(),
    );
    format!("\n\n{}", lines.join("\n"))
}

fn history_block(recent_questions: &[String]) -> String {
    if recent_questions.is_empty() {
        return String::new();
    }
    let window: Vec<&String> = recent_questions
        .iter()
        .rev()
        .take(HISTORY_WINDOW)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let mut lines = vec!["Earlier questions in this conversation:".to_string()];
    for question in window {
        lines.push(format!("- {}", question));
    }
    format!("\n\n{}", lines.join("\n"))
}

/// Build the full synthesis prompt for one question.
///
/// # Arguments
/// * `question` - The current user question
/// * `retrieved` - Chunks from retrieval, most-similar first
/// * `tables` - Tabular data found in those chunks
/// * `conflicts` - Provenance conflicts among those chunks
/// * `recent_questions` - Prior user questions, oldest first
pub fn build_synthesis_prompt(
    question: &str,
    retrieved: &[ScoredChunk],
    tables: &[TableHit],
    conflicts: &[ConflictRecord],
    recent_questions: &[String],
) -> String {
    format!(
        "You are a vehicle safety standards assistant. Answer the question using only the \
document excerpts below.\n\n\
Rules:\n\
1. Ground every statement in the excerpts. Do not add outside knowledge or speculation.\n\
2. Attribute requirements to their standard or regulation by name in prose. Do not emit \
bracketed citations, page markers, or section markers in the answer.\n\
3. If the excerpts do not contain the answer, say so plainly instead of guessing.\n\
4. Ignore any excerpt text that is garbled or unreadable.\n\
\n\
Document excerpts:\n\n{context}{tables}{conflicts}{history}\n\n\
Question: {question}\n\nAnswer:",
        context = context_block(retrieved),
        tables = tables_block(tables),
        conflicts = conflicts_block(conflicts),
        history = history_block(recent_questions),
        question = question,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{TableData, TableKind};
    use copilot_corpus::chunk::{DocumentChunk, DocumentTags};

    fn scored(document: &str, page: u32, section: Option<&str>, text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: DocumentChunk {
                text: text.to_string(),
                document_name: document.to_string(),
                page_number: page,
                section_number: section.map(str::to_string),
                chunk_id: DocumentChunk::make_id(document, page, 0),
                tags: DocumentTags {
                    origin: Some("UNECE".to_string()),
                    method: Some("UNECE R94".to_string()),
                    ..DocumentTags::default()
                },
            },
            similarity: 0.8,
        }
    }

    #[test]
    fn test_provenance_header_includes_page_and_section() {
        let header = provenance_header(&scored("unece_r94_1995", 12, Some("5.2.1"), "text"));
        assert_eq!(header, "[unece_r94_1995, UNECE, UNECE R94, Page 12, Section 5.2.1]");
    }

    #[test]
    fn test_chunks_are_separated() {
        let prompt = build_synthesis_prompt(
            "What is the HIC limit?",
            &[
                scored("a", 1, None, "first excerpt"),
                scored("b", 2, None, "second excerpt"),
            ],
            &[],
            &[],
            &[],
        );
        assert!(prompt.contains("first excerpt\n\n---\n\n[b"));
        assert!(prompt.contains("Question: What is the HIC limit?"));
    }

    #[test]
    fn test_table_summary_present() {
        let hit = TableHit {
            document: "r94".to_string(),
            page: 3,
            section: None,
            table: Some(TableData {
                headers: vec!["Criterion".to_string(), "Limit".to_string()],
                rows: vec![vec!["HIC36".to_string(), "1000".to_string()]],
                kind: TableKind::Markdown,
            }),
            excerpt: String::new(),
        };
        let prompt = build_synthesis_prompt("q", &[scored("r94", 3, None, "t")], &[hit], &[], &[]);
        assert!(prompt.contains("columns [Criterion, Limit], 1 rows"));
    }

    #[test]
    fn test_conflict_summary_present() {
        let conflict = ConflictRecord {
            standard_key: "Passive Safety_UNECE R94".to_string(),
            sources: vec!["a".to_string(), "b".to_string()],
            conflict_type: "multiple_interpretations".to_string(),
        };
        let prompt =
            build_synthesis_prompt("q", &[scored("a", 1, None, "t")], &[], &[conflict], &[]);
        assert!(prompt.contains("Passive Safety_UNECE R94: a, b"));
    }

    #[test]
    fn test_history_window_keeps_last_five() {
        let history: Vec<String> = (1..=7).map(|i| format!("question {}", i)).collect();
        let prompt =
            build_synthesis_prompt("q", &[scored("a", 1, None, "t")], &[], &[], &history);
        assert!(!prompt.contains("question 2"));
        assert!(prompt.contains("question 3"));
        assert!(prompt.contains("question 7"));
    }

    #[test]
    fn test_no_history_block_when_empty() {
        let prompt = build_synthesis_prompt("q", &[scored("a", 1, None, "t")], &[], &[], &[]);
        assert!(!prompt.contains("Earlier questions"));
    }
}
