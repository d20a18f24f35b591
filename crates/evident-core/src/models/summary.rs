//! Generated summary model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive date range echoed back by the summary endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Text summary generated by the log service over a date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: String,
    pub format: String,
    pub text_content: String,
    pub date_range: SummaryRange,
    pub log_count: u32,
}

/// Whether the signed-in account may export another summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPermission {
    pub allowed: bool,
    #[serde(default)]
    pub reason: Option<String>,
}
