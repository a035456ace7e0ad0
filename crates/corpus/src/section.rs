//! Section-number extraction from chunk text.

use regex::Regex;
use std::sync::LazyLock;

static EXPLICIT_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Section|Clause|Part)\s+(\d+\.\d+(?:\.\d+)*)")
        .expect("explicit section regex is valid")
});

static LEADING_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+(?:\.\d+)*(?:\s+[A-Z][a-z]+)?").expect("leading clause regex is valid")
});

/// Extract a dotted clause identifier (e.g. "5.2.3") from chunk text.
///
/// Tries an explicit "Section/Clause/Part N.N" reference anywhere in the
/// text first; failing that, scans only the first 3 lines for a line that
/// begins with a dotted numeral (optionally followed by a capitalized
/// heading word) and returns the numeral token.
pub fn extract_section_number(text: &str) -> Option<String> {
    if let Some(caps) = EXPLICIT_SECTION_RE.captures(text) {
        return Some(caps[1].to_string());
    }

    for line in text.lines().take(3) {
        if let Some(m) = LEADING_CLAUSE_RE.find(line.trim()) {
            let token = m.as_str().split_whitespace().next()?;
            return Some(token.to_string());
        }
    }

    None
}
