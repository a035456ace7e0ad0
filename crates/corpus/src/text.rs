//! Text cleaning and readability heuristics for PDF-extracted text.
//!
//! Column-based PDF extraction produces merged words, control characters,
//! and runs of garbage symbols. Cleaning repairs what it can; the named
//! readability predicates decide what gets dropped. Thresholds live at the
//! call sites so each gate stays independently tunable and testable.

use regex::Regex;
use std::sync::LazyLock;

/// Technical symbols that survive cleaning (units, operators, Greek letters).
const ALLOWED_SYMBOLS: &str = "-.,;:()[]{}%°±×÷≤≥≠≈∞∑∏∫√αβγδεθλμπστφω";

static CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F\u{0080}-\u{009F}]")
        .expect("control-char regex is valid")
});

static MERGED_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("merged-word regex is valid"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// True for characters allowed to appear in cleaned text.
fn is_allowed_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || ALLOWED_SYMBOLS.contains(c)
}

/// Clean raw PDF-extracted text before chunking.
///
/// - strips C0/C1 control characters
/// - inserts a space at lowercase-uppercase merges ("safetyRequirement")
/// - collapses runs of 3+ identical disallowed symbols to a single space
/// - collapses whitespace runs to a single space
pub fn clean_extracted_text(text: &str) -> String {
    let cleaned = CONTROL_RE.replace_all(text, " ");
    let cleaned = MERGED_WORD_RE.replace_all(&cleaned, "$1 $2");
    let cleaned = collapse_symbol_runs(&cleaned);
    WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string()
}

/// Split a merged lowercase-uppercase boundary ("valueThe" -> "value The").
pub fn split_merged_words(text: &str) -> String {
    MERGED_WORD_RE.replace_all(text, "$1 $2").to_string()
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Replace runs of 3+ identical disallowed symbols with a single space.
///
/// These runs ("~~~~~", "\u{fffd}\u{fffd}\u{fffd}") are extraction garbage,
/// not content.
pub fn collapse_symbol_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut iter = text.chars().peekable();
    while let Some(c) = iter.next() {
        let mut run = 1;
        while iter.peek() == Some(&c) {
            iter.next();
            run += 1;
        }
        if run >= 3 && !is_allowed_char(c) {
            out.push(' ');
        } else {
            for _ in 0..run {
                out.push(c);
            }
        }
    }
    out
}

/// Collapse garbled repeated-character runs in generated or extracted text.
///
/// Runs of 3+ identical letters shrink to one letter ("loooong" stays a
/// word); runs of 3+ identical symbols become a single space.
pub fn collapse_garbled_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut iter = text.chars().peekable();
    while let Some(c) = iter.next() {
        let mut run = 1;
        while iter.peek() == Some(&c) {
            iter.next();
            run += 1;
        }
        if run >= 3 && c.is_alphabetic() {
            out.push(c);
        } else if run >= 3 && !c.is_alphanumeric() && !c.is_whitespace() {
            out.push(' ');
        } else {
            for _ in 0..run {
                out.push(c);
            }
        }
    }
    out
}

/// Replace every character outside the allowed set with a space.
pub fn strip_disallowed_symbols(text: &str) -> String {
    text.chars()
        .map(|c| if is_allowed_char(c) { c } else { ' ' })
        .collect()
}

/// Fraction of characters that are alphanumeric or whitespace.
///
/// Empty input scores 0.0.
pub fn alphanumeric_ratio(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let readable = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .count();
    readable as f32 / total as f32
}

/// Readability gate: alphanumeric-or-whitespace ratio at or above `threshold`.
pub fn is_readable(text: &str, threshold: f32) -> bool {
    !text.is_empty() && alphanumeric_ratio(text) >= threshold
}

/// Fraction of whitespace-separated tokens that are single letters.
///
/// A high ratio ("Ove In ra ju ll ry") marks text shredded by extraction.
pub fn single_letter_ratio(text: &str) -> f32 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let singles = words
        .iter()
        .filter(|w| w.chars().count() == 1 && w.chars().all(|c| c.is_alphabetic()))
        .count();
    singles as f32 / words.len() as f32
}

/// Garbled-sentence gate: unreadable or too many single-letter tokens.
pub fn is_garbled_sentence(sentence: &str, single_letter_limit: f32) -> bool {
    !is_readable(sentence, 0.6) || single_letter_ratio(sentence) > single_letter_limit
}

/// Split text into sentence candidates on terminal punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    static SENTENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence regex is valid"));
    SENTENCE_RE
        .split(text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_control_chars() {
        let cleaned = clean_extracted_text("safety\u{0007}critical\u{009C} systems");
        assert_eq!(cleaned, "safety critical systems");
    }

    #[test]
    fn test_clean_splits_merged_words() {
        let cleaned = clean_extracted_text("hazardAnalysis and riskAssessment");
        assert_eq!(cleaned, "hazard Analysis and risk Assessment");
    }

    #[test]
    fn test_clean_collapses_symbol_runs() {
        let cleaned = clean_extracted_text("requirements ~~~~~ shall apply");
        assert_eq!(cleaned, "requirements shall apply");
    }

    #[test]
    fn test_clean_keeps_technical_symbols() {
        let cleaned = clean_extracted_text("HIC ≤ 1000 at ±5°");
        assert_eq!(cleaned, "HIC ≤ 1000 at ±5°");
    }

    #[test]
    fn test_collapse_garbled_runs() {
        assert_eq!(collapse_garbled_runs("ooops"), "ooops");
        assert_eq!(collapse_garbled_runs("nooooo"), "no");
        assert_eq!(collapse_garbled_runs("a###b"), "a b");
    }

    #[test]
    fn test_alphanumeric_ratio() {
        assert!(alphanumeric_ratio("clean readable text") > 0.99);
        assert!(alphanumeric_ratio("@@@@ #### $$$$") < 0.3);
        assert_eq!(alphanumeric_ratio(""), 0.0);
    }

    #[test]
    fn test_is_readable_thresholds() {
        assert!(is_readable("The HIC limit is 1000", 0.6));
        assert!(!is_readable("~!@#$%^&*()_+~!@#$", 0.6));
        assert!(!is_readable("", 0.6));
    }

    #[test]
    fn test_single_letter_ratio() {
        assert_eq!(single_letter_ratio("normal words only here"), 0.0);
        assert!(single_letter_ratio("O v e r a l l injury") > 0.5);
        // digits are not letters
        assert_eq!(single_letter_ratio("1 2 3 4"), 0.0);
    }

    #[test]
    fn test_is_garbled_sentence() {
        assert!(!is_garbled_sentence("The test procedure applies.", 0.3));
        assert!(is_garbled_sentence("O v e r a l l i n j u r y", 0.3));
        assert!(is_garbled_sentence("$$$$ %%%% @@@@", 0.3));
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("First rule. Second rule! Third rule? Tail");
        assert_eq!(
            sentences,
            vec!["First rule", "Second rule", "Third rule", "Tail"]
        );
    }
}
