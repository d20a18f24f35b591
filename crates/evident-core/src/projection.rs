//! Merged, ordered view of remote and locally queued logs.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt;

use crate::models::{
    ActivityType, LocalId, LogEntry, LogSource, PendingLogEntry, RemoteLogId, TimeWindow,
};

/// Identity of a displayed log, which also decides how it is deleted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum LogRef {
    Remote(RemoteLogId),
    Local(LocalId),
}

impl LogRef {
    /// Interpret a user-supplied id: `local_…` ids are queued logs, anything
    /// else belongs to the log service.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<LocalId>() {
            Ok(local_id) => Some(Self::Local(local_id)),
            Err(_) if LocalId::is_local(raw) => None,
            Err(_) => Some(Self::Remote(RemoteLogId::new(raw))),
        }
    }
}

impl fmt::Display for LogRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(id) => write!(f, "{id}"),
            Self::Local(id) => write!(f, "{id}"),
        }
    }
}

/// One row of the projected list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEntry {
    pub key: LogRef,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub activity_type: ActivityType,
    pub description: String,
    pub reference: Option<String>,
    pub source: LogSource,
    /// Not yet acknowledged by the log service
    pub pending: bool,
}

impl From<&LogEntry> for ViewEntry {
    fn from(entry: &LogEntry) -> Self {
        Self {
            key: LogRef::Remote(entry.id.clone()),
            date: entry.date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            activity_type: entry.activity_type,
            description: entry.description.clone(),
            reference: entry.reference.clone(),
            source: entry.source,
            pending: false,
        }
    }
}

impl From<&PendingLogEntry> for ViewEntry {
    fn from(entry: &PendingLogEntry) -> Self {
        let log = &entry.log;
        Self {
            key: LogRef::Local(entry.local_id.clone()),
            date: log.date,
            start_time: log.start_time,
            end_time: log.end_time,
            activity_type: log.activity_type,
            description: log.description.clone(),
            reference: log.reference.clone(),
            source: log.source,
            pending: entry.is_pending(),
        }
    }
}

/// Where the rows of a [`LogView`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewSource {
    /// Remote list plus queued logs
    Remote,
    /// Local queue only (signed out, or the remote list failed)
    LocalFallback,
}

/// Result of loading a window for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogView {
    pub window: TimeWindow,
    pub source: ViewSource,
    pub entries: Vec<ViewEntry>,
    /// User-facing explanation when the remote list could not be loaded
    pub notice: Option<String>,
}

impl LogView {
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.pending).count()
    }
}

/// Merge remote logs with queued ones, ordered by date then start time.
///
/// With a remote list, only still-pending queued logs are added: synced ones
/// have already been folded into the remote set. Without one, the whole queue
/// is shown and every row is flagged pending.
pub fn project(remote: Option<&[LogEntry]>, queued: &[PendingLogEntry]) -> Vec<ViewEntry> {
    let mut entries = match remote {
        Some(remote) => remote
            .iter()
            .map(ViewEntry::from)
            .chain(
                queued
                    .iter()
                    .filter(|entry| entry.is_pending())
                    .map(ViewEntry::from),
            )
            .collect::<Vec<_>>(),
        None => queued
            .iter()
            .map(|entry| ViewEntry {
                pending: true,
                ..ViewEntry::from(entry)
            })
            .collect(),
    };

    entries.sort_by_key(|entry| (entry.date, entry.start_time));
    entries
}
