//! Compliance guardrail for out-of-scope requests.
//!
//! The copilot reports what standards documents say; it must not act as a
//! legal advisor or a certification authority. Questions asking for those
//! services are refused before any retrieval or model call happens.

/// Lowercased phrases that mark a request as out of scope.
const REFUSAL_TRIGGERS: &[&str] = &[
    "legal interpretation",
    "legal advice",
    "approve",
    "approval",
    "certify",
    "certification",
    "guarantee",
    "warranty",
    "liability",
];

/// Fixed refusal for out-of-scope requests.
pub const COMPLIANCE_REFUSAL: &str = "I can summarize what the safety standards documents \
state, but I cannot provide legal interpretations, grant approvals or certifications, or \
make guarantees about compliance or liability. Please consult a qualified compliance \
authority for such determinations.";

/// Check whether a question must be refused on compliance grounds.
///
/// Returns the fixed refusal text when a trigger phrase appears in the
/// lowercased question, `None` otherwise.
pub fn compliance_refusal(question: &str) -> Option<&'static str> {
    let question_lower = question.to_lowercase();
    if REFUSAL_TRIGGERS
        .iter()
        .any(|trigger| question_lower.contains(trigger))
    {
        tracing::info!("Refusing out-of-scope request on compliance grounds");
        Some(COMPLIANCE_REFUSAL)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_advice_is_refused() {
        assert!(compliance_refusal("Give me legal advice on R155 compliance").is_some());
    }

    #[test]
    fn test_certification_is_refused() {
        assert!(compliance_refusal("Can you certify my vehicle against R94?").is_some());
        assert!(compliance_refusal("Is type APPROVAL granted by this test?").is_some());
    }

    #[test]
    fn test_ordinary_question_passes() {
        assert!(compliance_refusal("What is the HIC limit in UNECE R94?").is_none());
    }
}
