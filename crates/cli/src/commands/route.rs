//! Route command handler.
//!
//! Shows how a question would be classified and filtered before retrieval,
//! without calling any provider.

use clap::Args;
use copilot_core::AppResult;
use copilot_synthesis::classifier::QuestionRouting;
use copilot_synthesis::guardrails::compliance_refusal;

/// Show how a question would be routed and filtered
#[derive(Args, Debug)]
pub struct RouteCommand {
    /// The question to route
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RouteCommand {
    /// Execute the route command.
    pub fn execute(&self) -> AppResult<()> {
        let refused = compliance_refusal(&self.question).is_some();
        let routing = QuestionRouting::route(&self.question);

        if self.json {
            let output = serde_json::json!({
                "question": self.question,
                "refused": refused,
                "domains": routing.domains,
                "primaryDomain": routing.primary_domain,
                "needsSynthesis": routing.needs_synthesis,
                "needsScenarioReasoning": routing.needs_scenario_reasoning,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Question: {}", self.question);
            println!("Refused by guardrail: {}", refused);
            println!("Primary domain: {}", routing.primary_domain);
            println!("Domains: {}", routing.domains.join(", "));
            println!("Needs synthesis: {}", routing.needs_synthesis);
            println!("Needs scenario reasoning: {}", routing.needs_scenario_reasoning);
        }
        Ok(())
    }
}
