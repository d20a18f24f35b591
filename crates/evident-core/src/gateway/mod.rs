//! Remote log service boundary.

mod http;

use std::fmt;

use crate::error::Result;
use crate::models::{ExportPermission, LogEntry, NewLog, RemoteLogId, Summary, TimeWindow};
use crate::util::normalize_text_option;

pub use http::HttpLogGateway;
pub(crate) use http::read_json;

/// Bearer token presented to the log service
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token; blank tokens yield `None`.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        normalize_text_option(Some(token.into())).map(Self)
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("Credential")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Typed calls against the log service.
///
/// Every call needs a credential; supplying one is the caller's job.
/// Failures come back as `Network`, `Unauthorized` or `Server` errors and are
/// never swallowed here.
#[allow(async_fn_in_trait)]
pub trait RemoteLogGateway {
    /// Create a single log
    async fn create_log(&self, credential: &Credential, log: &NewLog) -> Result<LogEntry>;

    /// List the logs that fall inside `window`
    async fn list_logs(&self, credential: &Credential, window: TimeWindow)
        -> Result<Vec<LogEntry>>;

    /// Delete a log by its service id. Returns whether anything was deleted.
    async fn delete_log(&self, credential: &Credential, id: &RemoteLogId) -> Result<bool>;

    /// Submit a batch of logs in one call. Returns how many were accepted.
    async fn sync_logs(&self, credential: &Credential, logs: &[NewLog]) -> Result<usize>;

    /// Generate a text summary over `window`
    async fn generate_summary(
        &self,
        credential: &Credential,
        window: TimeWindow,
    ) -> Result<Summary>;

    /// Ask whether the account may export another summary
    async fn can_export(&self, credential: &Credential) -> Result<ExportPermission>;
}
