//! Data models for Evident

mod log;
mod pending;
mod summary;
mod window;

pub use log::{ActivityType, LogEntry, LogSource, NewLog, RemoteLogId, MAX_DESCRIPTION_LENGTH};
pub use pending::{LocalId, PendingLogEntry, SyncStatus};
pub use summary::{ExportPermission, Summary, SummaryRange};
pub use window::TimeWindow;
