//! Metadata inference from document paths.
//!
//! The PDF source tree carries semantic meaning in its folder names
//! (`unece_regulations/`, `nhtsa_guidelines/`, `passive_safety/`, ...), and
//! file stems carry standard codes and years. Tags are inferred once per
//! document by evaluating ordered, data-driven rule tables top-down with
//! first-match-wins semantics, so inference is a pure function of the path.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::chunk::DocumentTags;

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("year regex is valid"));

/// A rule matching folder-name or file-stem substrings to provenance tags.
struct ProvenanceRule {
    folder_keys: &'static [&'static str],
    file_keys: &'static [&'static str],
    origin: &'static str,
    strictness: &'static str,
    source_type: &'static str,
}

/// Ordered provenance rules; the first matching rule wins.
const PROVENANCE_RULES: &[ProvenanceRule] = &[
    ProvenanceRule {
        folder_keys: &["unece"],
        file_keys: &[],
        origin: "UNECE",
        strictness: "Regulatory",
        source_type: "Regulation",
    },
    ProvenanceRule {
        folder_keys: &["nhtsa"],
        file_keys: &[],
        origin: "NHTSA",
        strictness: "Guideline",
        source_type: "Guideline",
    },
    ProvenanceRule {
        folder_keys: &["functional_safety"],
        file_keys: &["tuv", "dekra"],
        origin: "Industry",
        strictness: "Standard",
        source_type: "Standard",
    },
    ProvenanceRule {
        folder_keys: &["validation"],
        file_keys: &[],
        origin: "Industry",
        strictness: "Best Practice",
        source_type: "Whitepaper",
    },
];

/// Provenance defaults when no rule matches.
const DEFAULT_PROVENANCE: (&str, &str, &str) = ("Industry", "Standard", "Document");

/// A rule matching folder-name or file-stem substrings to a safety domain.
struct DomainRule {
    folder_keys: &'static [&'static str],
    file_keys: &'static [&'static str],
    domain: &'static str,
}

/// Ordered domain rules; the first matching rule wins.
const DOMAIN_RULES: &[DomainRule] = &[
    DomainRule {
        folder_keys: &["cybersecurity"],
        file_keys: &["r155"],
        domain: "Cybersecurity",
    },
    DomainRule {
        folder_keys: &["software_update"],
        file_keys: &["r156"],
        domain: "Software Update",
    },
    DomainRule {
        folder_keys: &["functional_safety"],
        file_keys: &["asil", "iso_26262"],
        domain: "Functional Safety",
    },
    DomainRule {
        folder_keys: &["adas"],
        file_keys: &["adas"],
        domain: "ADAS",
    },
    DomainRule {
        folder_keys: &[],
        file_keys: &["driver_monitoring", "dms"],
        domain: "Driver Monitoring",
    },
    DomainRule {
        folder_keys: &["passive_safety", "ncap_protocols"],
        file_keys: &["r94", "r137", "fmvss", "ncap"],
        domain: "Passive Safety",
    },
    DomainRule {
        folder_keys: &["validation"],
        file_keys: &[],
        domain: "Validation",
    },
];

/// Domain default when no rule matches.
const DEFAULT_DOMAIN: &str = "General Safety";

/// Standard-code substrings in the file stem mapped to canonical labels.
const METHOD_RULES: &[(&[&str], &str)] = &[
    (&["r155"], "UNECE R155"),
    (&["r156"], "UNECE R156"),
    (&["iso_26262", "iso26262"], "ISO 26262"),
    (&["asil"], "ISO 26262 ASIL"),
    (&["hara"], "HARA (ISO 26262)"),
    (&["r94"], "UNECE R94"),
    (&["r137"], "UNECE R137"),
    (&["fmvss_208", "fmvss208"], "FMVSS 208"),
];

/// Passive-safety test-type markers in the file stem.
const TEST_TYPE_RULES: &[(&[&str], &str)] = &[
    (&["frontal"], "Frontal"),
    (&["side_impact", "side"], "Side"),
    (&["pole"], "Pole"),
    (&["pedestrian"], "Pedestrian"),
    (&["post_crash", "post-crash"], "Post-Crash"),
];

/// Passive-safety injury-metric markers in the file stem.
const METRIC_RULES: &[(&[&str], &str)] = &[
    (&["hic"], "HIC"),
    (&["chest"], "Chest_Deflection"),
    (&["tibia"], "Tibia_Index"),
    (&["intrusion"], "Intrusion"),
];

/// Crash-test dummy markers in the file stem.
const DUMMY_TYPE_RULES: &[(&[&str], &str)] = &[
    (&["worldsid"], "WorldSID"),
    (&["hybrid_iii", "hybrid-iii", "hybrid3"], "Hybrid-III"),
    (&["thor"], "THOR-M"),
];

/// Infer metadata tags from a document's file path.
///
/// Inspects the lowercased parent-folder name and file stem against the
/// ordered rule tables above. A pure function: the same path always yields
/// the same tags.
pub fn extract_tags_from_path(path: &Path) -> DocumentTags {
    let folder = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();
    let stem = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    let (origin, strictness, source_type) = PROVENANCE_RULES
        .iter()
        .find(|rule| matches_rule(&folder, &stem, rule.folder_keys, rule.file_keys))
        .map(|rule| (rule.origin, rule.strictness, rule.source_type))
        .unwrap_or(DEFAULT_PROVENANCE);

    let domain = DOMAIN_RULES
        .iter()
        .find(|rule| matches_rule(&folder, &stem, rule.folder_keys, rule.file_keys))
        .map(|rule| rule.domain)
        .unwrap_or(DEFAULT_DOMAIN);

    DocumentTags {
        origin: Some(origin.to_string()),
        domain: Some(domain.to_string()),
        strictness: Some(strictness.to_string()),
        method: match_stem_table(&stem, METHOD_RULES),
        year: extract_year(&stem),
        source_type: Some(source_type.to_string()),
        test_type: match_stem_table(&stem, TEST_TYPE_RULES),
        metric: match_stem_table(&stem, METRIC_RULES),
        dummy_type: match_stem_table(&stem, DUMMY_TYPE_RULES),
    }
}

/// True when any folder key matches the folder or any file key matches the stem.
fn matches_rule(folder: &str, stem: &str, folder_keys: &[&str], file_keys: &[&str]) -> bool {
    folder_keys.iter().any(|key| folder.contains(key))
        || file_keys.iter().any(|key| stem.contains(key))
}

/// First matching entry in a (substrings, label) table over the file stem.
fn match_stem_table(stem: &str, table: &[(&[&str], &str)]) -> Option<String> {
    table
        .iter()
        .find(|(keys, _)| keys.iter().any(|key| stem.contains(key)))
        .map(|(_, label)| (*label).to_string())
}

/// First 4-digit 19xx/20xx token in the file stem.
fn extract_year(stem: &str) -> Option<u16> {
    YEAR_RE
        .find(stem)
        .and_then(|m| m.as_str().parse::<u16>().ok())
}
