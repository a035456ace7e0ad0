//! The canonical unit of retrievable text and its provenance metadata.

use serde::{Deserialize, Serialize};

/// Metadata tags inferred once per document and copied onto every chunk.
///
/// All fields are optional; they are a pure function of the document's
/// file path and are never mutated after inference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTags {
    /// Issuing-body class (e.g. "UNECE", "NHTSA", "Industry")
    pub origin: Option<String>,

    /// Safety domain (e.g. "Functional Safety", "Passive Safety")
    pub domain: Option<String>,

    /// Normative weight ("Regulatory", "Guideline", "Standard", "Best Practice")
    pub strictness: Option<String>,

    /// Specific standard or regulation code (e.g. "UNECE R155", "ISO 26262")
    pub method: Option<String>,

    /// Publication year from the file name, when present
    pub year: Option<u16>,

    /// Document class ("Regulation", "Guideline", "Standard", "Whitepaper", "Document")
    pub source_type: Option<String>,

    /// Passive-safety test type (e.g. "Frontal", "Side", "Pole")
    pub test_type: Option<String>,

    /// Passive-safety injury metric (e.g. "HIC", "Chest_Deflection")
    pub metric: Option<String>,

    /// Crash-test dummy type (e.g. "Hybrid-III", "WorldSID")
    pub dummy_type: Option<String>,
}

/// A bounded, attributable span of document text.
///
/// Chunks are created by the document processor during a single pass over a
/// document's pages and are read-only thereafter. Identity is the
/// deterministic `chunk_id`, derived from document name, page number, and
/// an intra-page sequence index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Cleaned chunk text; never empty or garbled past the readability gate
    pub text: String,

    /// Source document identifier (file stem), stable across the document
    pub document_name: String,

    /// 1-based page number
    pub page_number: u32,

    /// Dotted clause identifier (e.g. "5.2.3") when detected
    pub section_number: Option<String>,

    /// Deterministic identifier: `{document_name}_p{page}_c{index}`
    pub chunk_id: String,

    /// Document-level metadata tags
    #[serde(flatten)]
    pub tags: DocumentTags,
}

impl DocumentChunk {
    /// Build the deterministic chunk identifier.
    pub fn make_id(document_name: &str, page_number: u32, index: usize) -> String {
        format!("{}_p{}_c{}", document_name, page_number, index)
    }
}

impl PartialEq for DocumentChunk {
    fn eq(&self, other: &Self) -> bool {
        self.chunk_id == other.chunk_id
    }
}

impl Eq for DocumentChunk {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_format() {
        assert_eq!(
            DocumentChunk::make_id("unece_r155_2021", 4, 2),
            "unece_r155_2021_p4_c2"
        );
    }

    #[test]
    fn test_equality_is_by_chunk_id() {
        let a = DocumentChunk {
            text: "some text".to_string(),
            document_name: "doc".to_string(),
            page_number: 1,
            section_number: None,
            chunk_id: "doc_p1_c0".to_string(),
            tags: DocumentTags::default(),
        };
        let mut b = a.clone();
        b.text = "different text".to_string();
        assert_eq!(a, b);

        b.chunk_id = "doc_p1_c1".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tags_serialize_flattened() {
        let chunk = DocumentChunk {
            text: "t".to_string(),
            document_name: "doc".to_string(),
            page_number: 1,
            section_number: Some("5.2".to_string()),
            chunk_id: "doc_p1_c0".to_string(),
            tags: DocumentTags {
                origin: Some("UNECE".to_string()),
                ..DocumentTags::default()
            },
        };
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["origin"], "UNECE");
        assert_eq!(value["section_number"], "5.2");
    }
}
