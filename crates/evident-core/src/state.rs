//! Observable sync state shared by every front end.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ErrorKind;

/// Whether a sync round is running right now
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
}

/// Why a sync round did nothing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NoCredential,
    NothingPending,
    AlreadyRunning,
}

/// Result of one sync round
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum SyncOutcome {
    Skipped { reason: SkipReason },
    Synced { count: usize },
    Failed { kind: ErrorKind, message: String },
}

impl SyncOutcome {
    #[must_use]
    pub const fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Snapshot published on the coordinator's watch channel
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub state: SyncState,
    pub last_outcome: Option<SyncOutcome>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_report_is_idle_without_history() {
        let report = SyncReport::default();
        assert_eq!(report.state, SyncState::Idle);
        assert!(report.last_outcome.is_none());
    }

    #[test]
    fn outcome_serializes_with_result_tag() {
        let json = serde_json::to_value(SyncOutcome::Synced { count: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"result": "synced", "count": 3}));

        let json = serde_json::to_value(SyncOutcome::skipped(SkipReason::NothingPending)).unwrap();
        assert_eq!(json["reason"], "nothing-pending");
    }
}
