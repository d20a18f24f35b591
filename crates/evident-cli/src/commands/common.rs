use std::env;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use evident_core::config::ClientConfig;
use evident_core::db::LibSqlKeyValueStore;
use evident_core::projection::{LogView, ViewEntry};
use evident_core::state::SkipReason;
use evident_core::{
    HttpLogGateway, LocalLogStore, PendingLogEntry, SessionContext, SyncCoordinator, SyncOutcome,
};

use crate::auth::KeyringSessionStore;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub type Coordinator = SyncCoordinator<HttpLogGateway, LibSqlKeyValueStore>;

const DB_PATH_ENV: &str = "EVIDENT_DB_PATH";

/// Everything a command needs to reach the local store and the log service
pub struct Context {
    pub profile_name: String,
    pub config: ClientConfig,
    pub db_path: PathBuf,
}

impl Context {
    pub fn resolve(profile: Option<&str>, db_path: Option<PathBuf>) -> Result<Self, CliError> {
        let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = profiles.resolve_profile_name(profile);
        let config = profiles
            .client_config(&profile_name)
            .map_err(CliError::Config)?;
        Ok(Self {
            profile_name,
            config,
            db_path: resolve_db_path(db_path)?,
        })
    }

    pub async fn open_coordinator(&self) -> Result<Coordinator, CliError> {
        let kv = LibSqlKeyValueStore::open(&self.db_path).await?;
        let session = SessionContext::restore(KeyringSessionStore::new(&self.profile_name))?;
        let gateway = HttpLogGateway::from_config(&self.config)?;
        tracing::debug!(
            profile = %self.profile_name,
            api = %gateway.base_url(),
            "Opened log coordinator"
        );
        Ok(
            SyncCoordinator::new(gateway, LocalLogStore::new(kv), session)
                .with_sync_on_resume(self.config.sync_on_resume),
        )
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(path) = cli_db_path.or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from)) {
        return Ok(path);
    }
    default_db_path()
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("evident").join("evident.db"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub fn normalize_description(parts: &[String]) -> Result<String, CliError> {
    let joined = parts.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyDescription)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_log_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyLogId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn format_duration(start: NaiveTime, end: NaiveTime) -> String {
    let minutes = (end - start).num_minutes().max(0);
    match (minutes / 60, minutes % 60) {
        (0, minutes) => format!("{minutes}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, minutes) => format!("{hours}h{minutes:02}m"),
    }
}

pub fn format_entry_line(entry: &ViewEntry) -> String {
    let marker = if entry.pending { "*" } else { " " };
    let span = format!(
        "{}-{}",
        entry.start_time.format("%H:%M"),
        entry.end_time.format("%H:%M")
    );
    let duration = format_duration(entry.start_time, entry.end_time);
    let reference = entry
        .reference
        .as_deref()
        .map(|reference| format!("  [{reference}]"))
        .unwrap_or_default();

    format!(
        "{marker} {}  {span}  {duration:>6}  {:<8} {}{reference}  ({})",
        entry.date.format("%a %d %b"),
        entry.activity_type,
        entry.description,
        entry.key
    )
}

pub fn format_view_lines(view: &LogView) -> Vec<String> {
    let mut lines = view.entries.iter().map(format_entry_line).collect::<Vec<_>>();
    if view.entries.is_empty() {
        lines.push(format!("No logs for {}.", view.window.label().to_lowercase()));
    }
    let pending = view.pending_count();
    if pending > 0 {
        lines.push(format!("* {pending} pending sync"));
    }
    lines
}

pub fn format_pending_line(entry: &PendingLogEntry) -> String {
    let log = &entry.log;
    format!(
        "{}  {} {}-{}  {:<8} {}",
        entry.local_id,
        log.date,
        log.start_time.format("%H:%M"),
        log.end_time.format("%H:%M"),
        log.activity_type,
        log.description
    )
}

pub fn describe_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Synced { count: 1 } => "Synced 1 log".to_string(),
        SyncOutcome::Synced { count } => format!("Synced {count} logs"),
        SyncOutcome::Skipped {
            reason: SkipReason::NothingPending,
        } => "Nothing to sync".to_string(),
        SyncOutcome::Skipped {
            reason: SkipReason::NoCredential,
        } => "Not signed in; logs stay queued on this device".to_string(),
        SyncOutcome::Skipped {
            reason: SkipReason::AlreadyRunning,
        } => "A sync is already running".to_string(),
        SyncOutcome::Failed { message, .. } => {
            format!("Sync failed, logs stay queued: {message}")
        }
    }
}

pub fn write_output(path: Option<&Path>, content: &str) -> Result<(), CliError> {
    if let Some(path) = path {
        std::fs::write(path, content)?;
        println!("{}", path.display());
    } else {
        println!("{content}");
    }
    Ok(())
}
