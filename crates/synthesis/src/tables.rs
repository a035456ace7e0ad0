//! Tabular data detection and extraction from chunk text.
//!
//! PDF extraction flattens tables into text. This module recognizes the
//! residue (pipe rows, wide whitespace columns, tab columns, numbered
//! requirement grids) and rebuilds a structured header/rows form where
//! possible so the synthesis prompt can present the values faithfully.

use copilot_corpus::retrieval::ScoredChunk;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Largest excerpt carried alongside an extracted table.
const EXCERPT_CHARS: usize = 500;

static PIPE_ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\s*[^|]+\s*\|").expect("pipe row regex is valid"));

static WIDE_COLUMN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{3,}\S+\s{3,}").expect("wide column regex is valid"));

static TAB_COLUMN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+[^\t]+").expect("tab column regex is valid"));

static NUMBERED_GRID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\d+\s+[A-Z]").expect("numbered grid regex is valid"));

static ASIL_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ASIL\s+[A-D]").expect("ASIL cell regex is valid"));

static HIC_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"HIC\s+\d+").expect("HIC cell regex is valid"));

static CELL_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{3,}|\t+").expect("cell split regex is valid"));

/// How a table was recognized in the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Markdown pipe syntax
    Markdown,
    /// Whitespace or tab delimited columns
    Delimited,
}

/// Structured table rebuilt from flattened text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub kind: TableKind,
}

/// One table found in a retrieved chunk, with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableHit {
    pub document: String,
    pub page: u32,
    pub section: Option<String>,
    pub table: Option<TableData>,
    /// First part of the raw chunk text, kept for prompt context
    pub excerpt: String,
}

/// Whether a piece of text looks like it carries tabular data.
pub fn detect_table(text: &str) -> bool {
    PIPE_ROW_RE.is_match(text)
        || WIDE_COLUMN_RE.is_match(text)
        || TAB_COLUMN_RE.is_match(text)
        || NUMBERED_GRID_RE.is_match(text)
        || ASIL_CELL_RE.is_match(text)
        || HIC_CELL_RE.is_match(text)
}

/// Whether a markdown row is only a header separator (dashes and colons).
fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells
            .iter()
            .all(|cell| !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':'))
}

/// Split one markdown pipe row into trimmed cells.
fn split_pipe_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// Rebuild a markdown table: first pipe row is the header, separator rows
/// are skipped, and at least one data row is required.
fn extract_markdown_table(text: &str) -> Option<TableData> {
    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        if !line.contains('|') {
            continue;
        }
        let cells = split_pipe_row(line);
        if cells.len() < 2 {
            continue;
        }
        if is_separator_row(&cells) {
            continue;
        }
        match headers {
            None => headers = Some(cells),
            Some(_) => rows.push(cells),
        }
    }

    match (headers, rows.is_empty()) {
        (Some(headers), false) => Some(TableData {
            headers,
            rows,
            kind: TableKind::Markdown,
        }),
        _ => None,
    }
}

/// Rebuild a whitespace/tab delimited table: lines splitting into two or
/// more cells, with at least two such lines. The first is the header.
fn extract_delimited_table(text: &str) -> Option<TableData> {
    let mut parsed: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let cells: Vec<String> = CELL_SPLIT_RE
            .split(trimmed)
            .map(|cell| cell.trim().to_string())
            .filter(|cell| !cell.is_empty())
            .collect();
        if cells.len() >= 2 {
            parsed.push(cells);
        }
    }

    if parsed.len() < 2 {
        return None;
    }
    let headers = parsed.remove(0);
    Some(TableData {
        headers,
        rows: parsed,
        kind: TableKind::Delimited,
    })
}

/// Attempt to rebuild structure from flattened table text.
///
/// Markdown pipe syntax wins when present; otherwise columns separated by
/// three or more spaces or by tabs are tried. Returns `None` when neither
/// form yields a coherent table.
pub fn extract_table(text: &str) -> Option<TableData> {
    extract_markdown_table(text).or_else(|| extract_delimited_table(text))
}

/// Scan retrieved chunks for tabular data.
///
/// Every chunk whose text matches a table pattern produces one hit; the
/// structured form is attached when it can be rebuilt, and the raw
/// excerpt is always carried so nothing is lost when parsing fails.
pub fn find_tables(retrieved: &[ScoredChunk]) -> Vec<TableHit> {
    retrieved
        .iter()
        .filter(|scored| detect_table(&scored.chunk.text))
        .map(|scored| {
            let excerpt: String = scored.chunk.text.chars().take(EXCERPT_CHARS).collect();
            TableHit {
                document: scored.chunk.document_name.clone(),
                page: scored.chunk.page_number,
                section: scored.chunk.section_number.clone(),
                table: extract_table(&scored.chunk.text),
                excerpt,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_corpus::chunk::{DocumentChunk, DocumentTags};

    fn scored(text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: DocumentChunk {
                text: text.to_string(),
                document_name: "r94_frontal".to_string(),
                page_number: 4,
                section_number: Some("5.2".to_string()),
                chunk_id: DocumentChunk::make_id("r94_frontal", 4, 0),
                tags: DocumentTags::default(),
            },
            similarity: 0.8,
        }
    }

    #[test]
    fn test_detects_pipe_table() {
        assert!(detect_table("| Criterion | Limit |\n| HIC | 1000 |"));
    }

    #[test]
    fn test_detects_asil_and_hic_cells() {
        assert!(detect_table("The hazard is rated ASIL B overall."));
        assert!(detect_table("A HIC 700 ceiling applies to out of position tests."));
    }

    #[test]
    fn test_plain_prose_is_not_a_table() {
        assert!(!detect_table("The restraint system shall deploy within the stated interval."));
    }

    #[test]
    fn test_markdown_table_extraction() {
        let text = "| Criterion | Limit |\n|---|---|\n| HIC36 | 1000 |\n| Chest deflection | 42 mm |";
        let table = extract_table(text).unwrap();
        assert_eq!(table.kind, TableKind::Markdown);
        assert_eq!(table.headers, vec!["Criterion", "Limit"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["Chest deflection", "42 mm"]);
    }

    #[test]
    fn test_markdown_table_without_data_rows_is_rejected() {
        assert!(extract_table("| Criterion | Limit |\n|---|---|").is_none());
    }

    #[test]
    fn test_whitespace_delimited_extraction() {
        let text = "Criterion     Limit\nHIC36     1000\nNij     1.0";
        let table = extract_table(text).unwrap();
        assert_eq!(table.kind, TableKind::Delimited);
        assert_eq!(table.headers, vec!["Criterion", "Limit"]);
        assert_eq!(table.rows, vec![vec!["HIC36", "1000"], vec!["Nij", "1.0"]]);
    }

    #[test]
    fn test_single_delimited_line_is_rejected() {
        assert!(extract_table("Criterion     Limit").is_none());
    }

    #[test]
    fn test_find_tables_keeps_excerpt_when_parse_fails() {
        let chunks = vec![scored("The hazard is rated ASIL B for this scenario.")];
        let hits = find_tables(&chunks);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].table.is_none());
        assert!(hits[0].excerpt.contains("ASIL B"));
        assert_eq!(hits[0].document, "r94_frontal");
        assert_eq!(hits[0].page, 4);
    }

    #[test]
    fn test_find_tables_skips_plain_chunks() {
        let chunks = vec![scored("No structured values appear in this passage at all.")];
        assert!(find_tables(&chunks).is_empty());
    }
}
