pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fields of one investment opportunity. A field is `None` when the step
/// that produces it failed during the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub revenue_currency: Option<String>,
    pub risk_assessment: Option<String>,
    pub exit_strategy: Option<String>,
}

/// One research lookup: the page, the focus used, and the model's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchRecord {
    pub url: String,
    pub task: Option<String>,
    pub result: Option<String>,
}

/// The durable form of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredRecord {
    Investment(InvestmentRecord),
    Research(ResearchRecord),
}

impl StoredRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            StoredRecord::Investment(_) => "investment",
            StoredRecord::Research(_) => "research",
        }
    }

    /// `(column, value)` pairs in display order.
    pub fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        match self {
            StoredRecord::Investment(r) => vec![
                ("company_name", r.company_name.as_deref()),
                ("sector", r.sector.as_deref()),
                ("revenue_currency", r.revenue_currency.as_deref()),
                ("risk_assessment", r.risk_assessment.as_deref()),
                ("exit_strategy", r.exit_strategy.as_deref()),
            ],
            StoredRecord::Research(r) => vec![
                ("url", Some(r.url.as_str())),
                ("task", r.task.as_deref()),
                ("result", r.result.as_deref()),
            ],
        }
    }

    /// All present field values joined by newlines, for indexing.
    pub fn text(&self) -> String {
        self.fields()
            .into_iter()
            .filter_map(|(_, v)| v)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub id: i64,
    pub created_at: String,
    pub record: StoredRecord,
}

/// Append-only result storage.
#[async_trait]
pub trait Store: Send + Sync {
    /// Append a record, returning its assigned id.
    async fn insert(&self, record: StoredRecord) -> Result<i64>;
    /// Every record ever inserted, oldest first.
    async fn all(&self) -> Result<Vec<StoredEntry>>;
    /// Records whose text contains `query`, oldest first.
    async fn search(&self, query: &str) -> Result<Vec<StoredEntry>>;
}
