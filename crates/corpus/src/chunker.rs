//! Sliding-window chunking with proportional word overlap.

use crate::chunk::{DocumentChunk, DocumentTags};
use crate::section::extract_section_number;
use crate::text::{clean_extracted_text, is_readable};

/// Readability gate for the trailing partial chunk of a page.
///
/// Full-size chunks are emitted unconditionally: at chunk size any garbling
/// is diluted below material levels, and the gate exists to drop trailing
/// extraction fragments, not mid-page content.
const FINAL_CHUNK_MIN_READABILITY: f32 = 0.6;

/// Chunk one page of text into overlapping segments.
///
/// The cleaned page text is tokenized on whitespace and accumulated word by
/// word (each word costs its character length plus one separator). A chunk
/// is emitted once the accumulated length reaches `chunk_size`; the next
/// buffer is seeded with the trailing overlap words. The overlap word count
/// is computed once per page as `max(1, words * chunk_overlap / chunk_size)`.
///
/// Chunk boundaries never cross a page break; every chunk carries the page
/// number, the document tags, and a sequential intra-page chunk id.
pub fn chunk_page(
    raw_text: &str,
    page_number: u32,
    document_name: &str,
    tags: &DocumentTags,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<DocumentChunk> {
    if raw_text.trim().is_empty() {
        return vec![];
    }

    let text = clean_extracted_text(raw_text);
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![];
    }

    let overlap_words = (words.len() * chunk_overlap / chunk_size).max(1);

    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_len = 0usize;
    let mut index = 0usize;

    for word in &words {
        buffer.push(word);
        buffer_len += word.chars().count() + 1;

        if buffer_len >= chunk_size {
            chunks.push(build_chunk(
                &buffer,
                page_number,
                document_name,
                tags,
                index,
            ));
            index += 1;

            // Seed the next buffer with the trailing overlap words
            if buffer.len() > overlap_words {
                buffer.drain(..buffer.len() - overlap_words);
            }
            buffer_len = buffer.iter().map(|w| w.chars().count() + 1).sum();
        }
    }

    // Flush the trailing partial chunk, gated on readability
    if !buffer.is_empty() {
        let tail = buffer.join(" ");
        if is_readable(&tail, FINAL_CHUNK_MIN_READABILITY) {
            chunks.push(build_chunk(
                &buffer,
                page_number,
                document_name,
                tags,
                index,
            ));
        } else {
            tracing::debug!(
                document = document_name,
                page = page_number,
                "Dropping unreadable trailing fragment"
            );
        }
    }

    chunks
}

fn build_chunk(
    words: &[&str],
    page_number: u32,
    document_name: &str,
    tags: &DocumentTags,
    index: usize,
) -> DocumentChunk {
    let text = words.join(" ");
    let section_number = extract_section_number(&text);
    DocumentChunk {
        chunk_id: DocumentChunk::make_id(document_name, page_number, index),
        text,
        document_name: document_name.to_string(),
        page_number,
        section_number,
        tags: tags.clone(),
    }
}
