//! Built-in step line-ups.

use anyhow::Result;

use super::{PipelineStep, Registry};

pub const MACRO_ANALYST: &str = "Macro Analyst";
pub const SECTOR_ANALYST: &str = "Sector Analyst";
pub const COMPANY_IDENTIFIER: &str = "Company Identifier";
pub const RISK_EVALUATOR: &str = "Risk Evaluator";
pub const INVESTMENT_ANALYST: &str = "Investment Analyst";

pub const MARKET_RESEARCH: &str = "Market Research Agent";
pub const COMPETITOR_ANALYSIS: &str = "Competitor Analysis Agent";
pub const SUMMARY: &str = "Summary Agent";

/// Shared by every investment step; the steps differ only in the strings
/// they fill in.
pub const INVESTMENT_TEMPLATE: &str = "You are the {name}.
Role: {role}

Task: {instruction}

Source material:
{input}";

pub const RESEARCH_TEMPLATE: &str = "You are the {name}. {role}

{instruction}

Website content:
{input}";

const INVESTMENT_STEPS: &[(&str, &str, &str)] = &[
    (
        MACRO_ANALYST,
        "Researching macroeconomic trends, currency stability, and regulatory impacts in the target sector.",
        "Analyze macroeconomic stability, inflation hedge mechanisms, and WAEMU FX regulations.",
    ),
    (
        SECTOR_ANALYST,
        "Identifying key trends, competitors, and pricing structures in the target industry.",
        "Assess key industry trends, market growth rates, pricing power, and regulatory compliance.",
    ),
    (
        COMPANY_IDENTIFIER,
        "Scraping and collecting information on potential investment targets.",
        "Identify SMEs matching investment criteria using web scraping and data aggregation.",
    ),
    (
        RISK_EVALUATOR,
        "Assessing financial, operational, and exit strategy risks for investment decisions.",
        "Evaluate financial risks, compliance factors, and propose exit strategies.",
    ),
    (
        INVESTMENT_ANALYST,
        "Compiling findings into structured reports.",
        "Compile findings into a structured investment report, including scalability, ESG impact, and recommended investment rationale.",
    ),
];

const RESEARCH_STEPS: &[(&str, &str, &str)] = &[
    (
        MARKET_RESEARCH,
        "You study markets: who buys, how many of them, and what drives demand.",
        "Describe the target market, its size, and its growth drivers as presented in the content.",
    ),
    (
        COMPETITOR_ANALYSIS,
        "You map competitive landscapes.",
        "List the competitors and alternatives the content mentions and how the company positions itself against them.",
    ),
    (
        SUMMARY,
        "You write short executive summaries.",
        "Summarize the content in one paragraph for an investment committee.",
    ),
];

fn build(steps: &[(&str, &str, &str)], template: &str) -> Result<Registry> {
    let mut registry = Registry::new();
    for (name, role, instruction) in steps {
        registry.register(PipelineStep::completion(name, role, instruction, template))?;
    }
    Ok(registry)
}

/// The five-step investment crew, run in full on every submission.
pub fn investment() -> Result<Registry> {
    build(INVESTMENT_STEPS, INVESTMENT_TEMPLATE)
}

/// Research focuses; one is picked per submission.
pub fn research() -> Result<Registry> {
    build(RESEARCH_STEPS, RESEARCH_TEMPLATE)
}
