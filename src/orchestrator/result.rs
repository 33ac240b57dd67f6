use crate::completer::TokenUsage;
use crate::pipeline::presets::{
    COMPANY_IDENTIFIER, INVESTMENT_ANALYST, MACRO_ANALYST, RISK_EVALUATOR, SECTOR_ANALYST,
};
use crate::store::{InvestmentRecord, ResearchRecord, StoredRecord};

/// Text one step produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub step: String,
    pub text: String,
}

/// A step whose capability failed.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    pub step: String,
    pub error: String,
}

/// Everything one orchestrator run produced, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub url: String,
    /// The focus picked in selectable mode; `None` for a full sequence.
    pub selected: Option<String>,
    /// Fetched page text (or the scrape error marker).
    pub content: String,
    pub outputs: Vec<StepOutput>,
    pub failures: Vec<StepFailure>,
    pub usage: TokenUsage,
}

impl RunResult {
    pub fn output(&self, step: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.step == step)
            .map(|o| o.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// The durable form of this run, or `None` when no step produced
    /// anything worth keeping.
    ///
    /// A full sequence becomes an investment record; outputs of steps that
    /// fill no investment field are not kept, and a run where no output
    /// lands in a field yields `None`.
    pub fn to_record(&self) -> Option<StoredRecord> {
        if self.is_empty() {
            return None;
        }

        if let Some(task) = &self.selected {
            return Some(StoredRecord::Research(ResearchRecord {
                url: self.url.clone(),
                task: Some(task.clone()),
                result: self.output(task).map(str::to_string),
            }));
        }

        let mut record = InvestmentRecord::default();
        let mut mapped = false;
        for output in &self.outputs {
            if let Some(slot) = investment_slot(&mut record, &output.step) {
                *slot = Some(output.text.clone());
                mapped = true;
            }
        }
        mapped.then_some(StoredRecord::Investment(record))
    }
}

/// Whether `step` fills one of the investment record's fields.
pub fn is_investment_step(step: &str) -> bool {
    matches!(
        step,
        MACRO_ANALYST | SECTOR_ANALYST | COMPANY_IDENTIFIER | RISK_EVALUATOR | INVESTMENT_ANALYST
    )
}

fn investment_slot<'a>(
    record: &'a mut InvestmentRecord,
    step: &str,
) -> Option<&'a mut Option<String>> {
    match step {
        MACRO_ANALYST => Some(&mut record.revenue_currency),
        SECTOR_ANALYST => Some(&mut record.sector),
        COMPANY_IDENTIFIER => Some(&mut record.company_name),
        RISK_EVALUATOR => Some(&mut record.risk_assessment),
        INVESTMENT_ANALYST => Some(&mut record.exit_strategy),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(selected: Option<&str>, outputs: &[(&str, &str)]) -> RunResult {
        RunResult {
            url: "http://example.com".into(),
            selected: selected.map(str::to_string),
            content: "Hello World".into(),
            outputs: outputs
                .iter()
                .map(|(s, t)| StepOutput {
                    step: s.to_string(),
                    text: t.to_string(),
                })
                .collect(),
            failures: vec![],
            usage: TokenUsage::default(),
        }
    }

    #[test]
    fn investment_fields_map_from_steps() {
        let result = run(
            None,
            &[
                (MACRO_ANALYST, "XOF pegged"),
                (SECTOR_ANALYST, "agritech"),
                (COMPANY_IDENTIFIER, "Acme SA"),
                (RISK_EVALUATOR, "moderate"),
                (INVESTMENT_ANALYST, "trade sale"),
            ],
        );
        let expected = StoredRecord::Investment(InvestmentRecord {
            company_name: Some("Acme SA".into()),
            sector: Some("agritech".into()),
            revenue_currency: Some("XOF pegged".into()),
            risk_assessment: Some("moderate".into()),
            exit_strategy: Some("trade sale".into()),
        });
        assert_eq!(result.to_record(), Some(expected));
    }

    #[test]
    fn failed_step_leaves_field_empty() {
        let result = run(None, &[(MACRO_ANALYST, "XOF pegged")]);
        match result.to_record() {
            Some(StoredRecord::Investment(r)) => {
                assert_eq!(r.revenue_currency.as_deref(), Some("XOF pegged"));
                assert!(r.company_name.is_none());
                assert!(r.exit_strategy.is_none());
            }
            other => panic!("expected investment record, got {other:?}"),
        }
    }

    #[test]
    fn selected_run_becomes_research_record() {
        let result = run(Some("Summary Agent"), &[("Summary Agent", "short")]);
        assert_eq!(
            result.to_record(),
            Some(StoredRecord::Research(ResearchRecord {
                url: "http://example.com".into(),
                task: Some("Summary Agent".into()),
                result: Some("short".into()),
            }))
        );
    }

    #[test]
    fn nothing_produced_means_nothing_to_store() {
        assert!(run(None, &[]).to_record().is_none());
    }

    #[test]
    fn unmapped_steps_are_not_stored_as_empty_record() {
        let result = run(None, &[("first", "alpha"), ("second", "beta")]);
        assert!(result.to_record().is_none());
    }

    #[test]
    fn investment_steps_are_recognised() {
        assert!(is_investment_step(RISK_EVALUATOR));
        assert!(!is_investment_step("Summary Agent"));
    }
}
