//! PDF page-text extraction with a two-extractor fallback.
//!
//! `pdf-extract` handles most documents; scanned or oddly-encoded files
//! that it rejects go through `lopdf` instead. A document that defeats
//! both extractors contributes zero pages — never a batch failure.

use copilot_core::{AppError, AppResult};
use std::path::Path;

/// Raw text of one PDF page.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number
    pub page_number: u32,
    /// Raw extracted text, not yet cleaned
    pub text: String,
}

/// Extract per-page text from a PDF.
///
/// Tries the primary extractor first and falls back to the secondary on
/// failure; on total failure the error is logged and an empty page list is
/// returned. Blank pages are skipped; page numbers are 1-based.
pub fn extract_pages(path: &Path) -> Vec<PageText> {
    match extract_with_pdf_extract(path) {
        Ok(pages) => pages,
        Err(primary_err) => {
            tracing::warn!(
                path = %path.display(),
                error = %primary_err,
                "Primary PDF extractor failed, falling back to lopdf"
            );
            match extract_with_lopdf(path) {
                Ok(pages) => pages,
                Err(fallback_err) => {
                    tracing::error!(
                        path = %path.display(),
                        error = %fallback_err,
                        "Both PDF extractors failed, skipping document"
                    );
                    vec![]
                }
            }
        }
    }
}

/// Primary extractor: `pdf-extract`.
fn extract_with_pdf_extract(path: &Path) -> AppResult<Vec<PageText>> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .map_err(|e| AppError::Corpus(format!("pdf-extract failed: {}", e)))?;

    Ok(collect_pages(pages.into_iter()))
}

/// Secondary extractor: `lopdf`.
fn extract_with_lopdf(path: &Path) -> AppResult<Vec<PageText>> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| AppError::Corpus(format!("lopdf failed to load: {}", e)))?;

    let mut texts = Vec::new();
    for (page_number, _) in doc.get_pages() {
        match doc.extract_text(&[page_number]) {
            Ok(text) => texts.push(text),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    page = page_number,
                    error = %e,
                    "lopdf failed to extract page, skipping"
                );
                texts.push(String::new());
            }
        }
    }

    Ok(collect_pages(texts.into_iter()))
}

/// Number pages from 1 and drop blank ones.
fn collect_pages(texts: impl Iterator<Item = String>) -> Vec<PageText> {
    texts
        .enumerate()
        .filter_map(|(i, text)| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(PageText {
                    page_number: (i + 1) as u32,
                    text: trimmed.to_string(),
                })
            }
        })
        .collect()
}
