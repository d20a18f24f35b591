//! Pending (not yet acknowledged) log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::NewLog;

const LOCAL_ID_PREFIX: &str = "local_";

/// Client-generated identifier of a queued log.
///
/// Built from a UUID v7, i.e. a millisecond timestamp followed by random
/// bits, so ids are unique across concurrent calls and sort by creation
/// time. Never sent to the log service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalId(String);

impl LocalId {
    /// Generate a fresh local id
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{LOCAL_ID_PREFIX}{}", Uuid::now_v7().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a user-supplied identifier looks like a local id
    pub fn is_local(candidate: &str) -> bool {
        candidate.trim().starts_with(LOCAL_ID_PREFIX)
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocalId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.strip_prefix(LOCAL_ID_PREFIX) {
            Some(rest) if !rest.is_empty() => Ok(Self(trimmed.to_string())),
            _ => Err(format!("'{trimmed}' is not a local log id")),
        }
    }
}

/// Sync status of a queued log. Only ever moves from `Pending` to `Synced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    #[default]
    Pending,
    Synced,
}

/// A log held in the offline queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLogEntry {
    #[serde(flatten)]
    pub log: NewLog,
    pub local_id: LocalId,
    pub status: SyncStatus,
    pub created_at: DateTime<Utc>,
}

impl PendingLogEntry {
    /// Queue a log under a freshly generated local id
    #[must_use]
    pub fn new(log: NewLog) -> Self {
        Self {
            log,
            local_id: LocalId::generate(),
            status: SyncStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == SyncStatus::Pending
    }

    /// Flip to `Synced`. Calling it twice is harmless.
    pub fn mark_synced(&mut self) {
        self.status = SyncStatus::Synced;
    }

    /// The payload sent to the log service, without local-only fields
    #[must_use]
    pub fn to_new_log(&self) -> NewLog {
        self.log.clone()
    }
}
