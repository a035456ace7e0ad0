//! Document and directory processing.
//!
//! Turns a PDF source tree into a flat sequence of metadata-tagged chunks.
//! Every document is processed independently: a file that yields zero pages
//! or zero chunks is logged and skipped, never fatal to the batch.

use copilot_core::config::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use copilot_core::AppConfig;
use std::path::Path;
use walkdir::WalkDir;

use crate::chunk::{DocumentChunk, DocumentTags};
use crate::chunker::chunk_page;
use crate::metadata::extract_tags_from_path;
use crate::pdf::{extract_pages, PageText};

/// Converts PDFs into sequences of [`DocumentChunk`]s.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl DocumentProcessor {
    /// Create a processor with explicit chunking parameters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Create a processor from application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Process a single PDF document into chunks.
    ///
    /// Metadata tags are inferred once from the path and copied onto every
    /// chunk. Chunking runs per page, so chunk boundaries never cross a
    /// page break.
    pub fn process_document(&self, path: &Path) -> Vec<DocumentChunk> {
        let document_name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let tags = extract_tags_from_path(path);
        tracing::info!(
            document = %document_name,
            origin = tags.origin.as_deref().unwrap_or("-"),
            domain = tags.domain.as_deref().unwrap_or("-"),
            strictness = tags.strictness.as_deref().unwrap_or("-"),
            method = tags.method.as_deref().unwrap_or("-"),
            "Processing document"
        );

        let pages = extract_pages(path);
        let chunks = self.chunk_pages(&pages, &document_name, &tags);

        tracing::info!(
            document = %document_name,
            pages = pages.len(),
            chunks = chunks.len(),
            "Processed document"
        );
        chunks
    }

    /// Chunk extracted pages in page order.
    ///
    /// Pages arrive sorted from extraction, so emitted chunks carry
    /// non-decreasing page numbers with the chunk index restarting per page.
    fn chunk_pages(
        &self,
        pages: &[PageText],
        document_name: &str,
        tags: &DocumentTags,
    ) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();
        for page in pages {
            chunks.extend(chunk_page(
                &page.text,
                page.page_number,
                document_name,
                tags,
                self.chunk_size,
                self.chunk_overlap,
            ));
        }
        chunks
    }

    /// Recursively process every PDF under a directory.
    ///
    /// Files are visited in sorted path order so batch output is
    /// deterministic. Documents that fail extraction contribute zero
    /// chunks; processing continues with the remaining files.
    pub fn process_directory(&self, root: &Path) -> Vec<DocumentChunk> {
        let mut pdf_files: Vec<_> = WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
            })
            .collect();
        pdf_files.sort();

        if pdf_files.is_empty() {
            tracing::warn!(root = %root.display(), "No PDF files found");
            return vec![];
        }

        tracing::info!(root = %root.display(), files = pdf_files.len(), "Processing PDF tree");

        let mut all_chunks = Vec::new();
        for path in &pdf_files {
            all_chunks.extend(self.process_document(path));
        }
        all_chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Enough words that each page splits into several chunks.
    fn multi_chunk_page_text() -> String {
        (0..150)
            .map(|i| format!("requirement{:03}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_page_numbers_are_monotone_across_pages() {
        let pages: Vec<PageText> = [1, 2, 5]
            .iter()
            .map(|&page_number| PageText {
                page_number,
                text: multi_chunk_page_text(),
            })
            .collect();

        let processor = DocumentProcessor::default();
        let chunks = processor.chunk_pages(&pages, "doc", &DocumentTags::default());

        assert!(chunks.len() > 3, "each page should yield several chunks");
        assert!(chunks
            .windows(2)
            .all(|pair| pair[0].page_number <= pair[1].page_number));
        // chunk index restarts on every page
        assert!(chunks.iter().any(|c| c.chunk_id == "doc_p2_c0"));
        assert!(chunks.iter().any(|c| c.chunk_id == "doc_p5_c0"));
    }

    #[test]
    fn test_empty_directory_yields_no_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let processor = DocumentProcessor::default();
        assert!(processor.process_directory(dir.path()).is_empty());
    }

    #[test]
    fn test_invalid_pdf_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("unece_regulations");
        std::fs::create_dir_all(&bad).unwrap();
        std::fs::write(bad.join("broken_r155_2021.pdf"), b"not a pdf at all").unwrap();

        let processor = DocumentProcessor::default();
        let chunks = processor.process_directory(dir.path());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_non_pdf_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"plain text").unwrap();

        let processor = DocumentProcessor::default();
        assert!(processor.process_directory(dir.path()).is_empty());
    }
}
