//! Question routing by domain keyword taxonomy.
//!
//! Classification is advisory: the resulting domain list narrows retrieval
//! and the boolean flags hint at synthesis and scenario reasoning, but
//! nothing downstream treats them as hard gates.

use regex::Regex;
use std::sync::LazyLock;

/// Domain returned when no keyword matches.
pub const GENERAL_DOMAIN: &str = "General Safety";

/// Ordered (domain, trigger keywords) table. Ties in keyword count keep
/// this encounter order.
const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Passive Safety",
        &[
            "passive safety",
            "crash",
            "collision",
            "impact",
            "airbag",
            "seatbelt",
            "restraint",
            "dummy",
            "chest deflection",
            "tibia",
            "intrusion",
            "frontal",
            "side impact",
            "pole test",
            "pedestrian",
            "post-crash",
            "r94",
            "r137",
            "fmvss 208",
            "ncap",
            "euro ncap",
            "offset barrier",
            "deformable barrier",
            "rigid barrier",
            "mpdb",
            "worldsid",
            "hybrid-iii",
            "thor",
            "hic",
            "injury criteria",
            "occupant protection",
        ],
    ),
    (
        "Functional Safety",
        &[
            "functional safety",
            "iso 26262",
            "asil",
            "hara",
            "safety goal",
            "safety requirement",
            "safety concept",
            "safety lifecycle",
            "fusa",
            "safety integrity",
            "random failure",
            "systematic failure",
        ],
    ),
    (
        "Cybersecurity",
        &[
            "cybersecurity",
            "r155",
            "cyber security",
            "threat",
            "vulnerability",
            "attack",
            "security",
            "unauthorized access",
            "data protection",
        ],
    ),
    (
        "ADAS",
        &[
            "adas",
            "advanced driver assistance",
            "autonomous",
            "self-driving",
            "lane keeping",
            "adaptive cruise",
            "collision avoidance",
            "aeb",
        ],
    ),
    (
        "Driver Monitoring",
        &[
            "driver monitoring",
            "dms",
            "driver attention",
            "fatigue",
            "driver state",
            "driver distraction",
            "eye tracking",
        ],
    ),
    (
        "Software Update",
        &[
            "software update",
            "r156",
            "ota",
            "over the air",
            "firmware update",
            "software version",
            "update management",
        ],
    ),
    (
        "Validation",
        &[
            "validation",
            "testing",
            "test case",
            "verification",
            "test scenario",
            "test procedure",
            "test coverage",
        ],
    ),
];

/// Cue words indicating cross-document synthesis is needed.
const SYNTHESIS_KEYWORDS: &[&str] = &[
    "compare",
    "difference",
    "conflict",
    "synthesize",
    "across",
    "multiple",
    "both",
    "versus",
    "vs",
    "between",
    "all",
    "together",
    "combine",
    "integrate",
    "unified",
    "table",
    "tabular",
    "data",
    "values",
    "threshold",
];

/// Cue words indicating scenario or hypothetical reasoning.
const SCENARIO_KEYWORDS: &[&str] = &[
    "what if",
    "scenario",
    "situation",
    "case",
    "example",
    "how would",
    "what happens",
    "what should",
    "recommend",
    "analyze",
    "evaluate",
    "assess",
    "determine",
    "decide",
    "apply",
    "implement",
    "design",
    "plan",
    "strategy",
    "when",
    "if",
    "suppose",
    "imagine",
    "consider",
];

static CONDITIONAL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"if\s+\w+\s+(happens|occurs|fails|works)",
        r"what\s+(should|would|could|might)",
        r"how\s+(should|would|could|might)",
        r"in\s+(case|situation|scenario|event)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("conditional regex is valid"))
    .collect()
});

/// Classify a question into domains, most relevant first.
///
/// Counts keyword hits per domain over the lowercased question; domains
/// with zero hits are dropped. The sort is stable, so ties keep the
/// encounter order of the domain table.
pub fn classify_domains(question: &str) -> Vec<String> {
    let question_lower = question.to_lowercase();

    let mut scored: Vec<(&str, usize)> = DOMAIN_KEYWORDS
        .iter()
        .map(|(domain, keywords)| {
            let score = keywords
                .iter()
                .filter(|kw| question_lower.contains(*kw))
                .count();
            (*domain, score)
        })
        .filter(|(_, score)| *score > 0)
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(domain, _)| domain.to_string()).collect()
}

/// The single most relevant domain, defaulting to "General Safety".
pub fn primary_domain(question: &str) -> String {
    classify_domains(question)
        .into_iter()
        .next()
        .unwrap_or_else(|| GENERAL_DOMAIN.to_string())
}

/// True when the question asks for comparison or aggregation across
/// documents.
pub fn needs_synthesis(question: &str) -> bool {
    let question_lower = question.to_lowercase();
    SYNTHESIS_KEYWORDS
        .iter()
        .any(|kw| question_lower.contains(kw))
}

/// True when the question calls for scenario-based reasoning or applies
/// knowledge to a hypothetical situation.
pub fn needs_scenario_reasoning(question: &str) -> bool {
    let question_lower = question.to_lowercase();

    if SCENARIO_KEYWORDS
        .iter()
        .any(|kw| question_lower.contains(kw))
    {
        return true;
    }

    CONDITIONAL_RES
        .iter()
        .any(|re| re.is_match(&question_lower))
}

/// Combined routing signal for one question.
#[derive(Debug, Clone)]
pub struct QuestionRouting {
    /// Matching domains, most relevant first; may be empty
    pub domains: Vec<String>,
    /// First domain or "General Safety"
    pub primary_domain: String,
    /// Cross-document synthesis hint
    pub needs_synthesis: bool,
    /// Scenario-reasoning hint
    pub needs_scenario_reasoning: bool,
}

impl QuestionRouting {
    /// Route a question through all classifiers.
    pub fn route(question: &str) -> Self {
        let domains = classify_domains(question);
        let primary = domains
            .first()
            .cloned()
            .unwrap_or_else(|| GENERAL_DOMAIN.to_string());
        Self {
            domains,
            primary_domain: primary,
            needs_synthesis: needs_synthesis(question),
            needs_scenario_reasoning: needs_scenario_reasoning(question),
        }
    }
}
