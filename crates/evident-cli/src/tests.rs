use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use clap::Parser;
use evident_core::models::{ActivityType, LocalId, LogSource, RemoteLogId};
use evident_core::projection::{LogView, ViewEntry, ViewSource};
use evident_core::state::SkipReason;
use evident_core::{ErrorKind, LogRef, SyncOutcome, TimeWindow};
use pretty_assertions::assert_eq;

use crate::cli::{parse_time, Cli, Commands, CompletionShell};
use crate::commands::common::{
    describe_outcome, format_duration, format_entry_line, format_view_lines,
    normalize_description, normalize_log_identifier, resolve_db_path,
};
use crate::commands::completions::render_completions;
use crate::commands::config::{apply_profile_update, ProfileUpdate};
use crate::commands::sync::watch_interval;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn entry(key: LogRef, pending: bool) -> ViewEntry {
    ViewEntry {
        key,
        date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        start_time: time(9, 0),
        end_time: time(10, 30),
        activity_type: ActivityType::Field,
        description: "Fixed pump".to_string(),
        reference: Some("JOB-42".to_string()),
        source: LogSource::Mobile,
        pending,
    }
}

#[test]
fn parse_time_accepts_minutes_and_seconds() {
    assert_eq!(parse_time("09:15").unwrap(), time(9, 15));
    assert_eq!(parse_time(" 17:05:00 ").unwrap(), time(17, 5));
    assert!(parse_time("9am").is_err());
}

#[test]
fn add_command_parses_log_fields() {
    let cli = Cli::try_parse_from([
        "evident",
        "add",
        "--start",
        "09:00",
        "--end",
        "10:30",
        "--activity",
        "field",
        "--date",
        "2025-03-10",
        "Fixed",
        "pump",
    ])
    .unwrap();

    let Some(Commands::Add(args)) = cli.command else {
        panic!("expected add command");
    };
    assert_eq!(args.description, vec!["Fixed", "pump"]);
    assert_eq!(args.start, time(9, 0));
    assert_eq!(args.end, time(10, 30));
    assert_eq!(args.activity, ActivityType::Field);
    assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 3, 10));
}

#[test]
fn list_command_defaults_to_today() {
    let cli = Cli::try_parse_from(["evident", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::List {
            window: TimeWindow::Today,
            json: false
        })
    ));

    let cli = Cli::try_parse_from(["evident", "--profile", "work", "list", "last-week"]).unwrap();
    assert_eq!(cli.profile.as_deref(), Some("work"));
    assert!(matches!(
        cli.command,
        Some(Commands::List {
            window: TimeWindow::LastWeek,
            ..
        })
    ));
}

#[test]
fn unknown_window_is_rejected() {
    assert!(Cli::try_parse_from(["evident", "list", "yesterday"]).is_err());
}

#[test]
fn normalize_description_joins_and_trims() {
    let parts = vec!["  Fixed".to_string(), "pump  ".to_string()];
    assert_eq!(normalize_description(&parts).unwrap(), "Fixed pump");
    assert!(matches!(
        normalize_description(&[" ".to_string()]),
        Err(CliError::EmptyDescription)
    ));
}

#[test]
fn normalize_log_identifier_rejects_blank() {
    assert!(matches!(
        normalize_log_identifier("  "),
        Err(CliError::EmptyLogId)
    ));
    assert_eq!(normalize_log_identifier(" r1 ").unwrap(), "r1");
}

#[test]
fn format_duration_units() {
    assert_eq!(format_duration(time(9, 0), time(9, 45)), "45m");
    assert_eq!(format_duration(time(9, 0), time(11, 0)), "2h");
    assert_eq!(format_duration(time(9, 0), time(10, 5)), "1h05m");
    assert_eq!(format_duration(time(10, 0), time(9, 0)), "0m");
}

#[test]
fn entry_line_marks_pending_rows() {
    let local = LocalId::generate();
    let line = format_entry_line(&entry(LogRef::Local(local.clone()), true));
    assert!(line.starts_with("* "));
    assert!(line.contains("09:00-10:30"));
    assert!(line.contains("[JOB-42]"));
    assert!(line.contains(local.as_str()));

    let line = format_entry_line(&entry(LogRef::Remote(RemoteLogId::new("r1")), false));
    assert!(line.starts_with("  "));
    assert!(line.ends_with("(r1)"));
}

#[test]
fn view_lines_report_empty_window_and_pending_count() {
    let empty = LogView {
        window: TimeWindow::ThisWeek,
        source: ViewSource::LocalFallback,
        entries: Vec::new(),
        notice: None,
    };
    assert_eq!(format_view_lines(&empty), vec!["No logs for this week."]);

    let view = LogView {
        window: TimeWindow::Today,
        source: ViewSource::Remote,
        entries: vec![
            entry(LogRef::Remote(RemoteLogId::new("r1")), false),
            entry(LogRef::Local(LocalId::generate()), true),
        ],
        notice: None,
    };
    let lines = format_view_lines(&view);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "* 1 pending sync");
}

#[test]
fn describe_outcome_messages() {
    assert_eq!(
        describe_outcome(&SyncOutcome::Synced { count: 1 }),
        "Synced 1 log"
    );
    assert_eq!(
        describe_outcome(&SyncOutcome::Synced { count: 3 }),
        "Synced 3 logs"
    );
    assert_eq!(
        describe_outcome(&SyncOutcome::skipped(SkipReason::NothingPending)),
        "Nothing to sync"
    );
    let failed = describe_outcome(&SyncOutcome::Failed {
        kind: ErrorKind::Network,
        message: "Network error: timed out".to_string(),
    });
    assert!(failed.contains("stay queued"));
    assert!(failed.ends_with("timed out"));
}

#[test]
fn resolve_db_path_prefers_explicit_path() {
    let explicit = PathBuf::from("/tmp/evident-test.db");
    assert_eq!(resolve_db_path(Some(explicit.clone())).unwrap(), explicit);
}

#[test]
fn watch_interval_precedence() {
    assert_eq!(
        watch_interval(Some(30), Some(Duration::from_secs(600))),
        Duration::from_secs(30)
    );
    assert_eq!(
        watch_interval(Some(0), Some(Duration::from_secs(600))),
        Duration::from_secs(600)
    );
    assert_eq!(watch_interval(None, None), Duration::from_secs(300));
}

#[test]
fn profile_update_validates_and_applies_fields() {
    let mut config = CliProfilesConfig {
        version: 1,
        active_profile: None,
        profiles: BTreeMap::new(),
    };

    let bad = ProfileUpdate {
        api_url: Some("api.example.com".to_string()),
        ..ProfileUpdate::default()
    };
    assert!(matches!(
        apply_profile_update(&mut config, "work", &bad),
        Err(CliError::Config(_))
    ));

    let update = ProfileUpdate {
        api_url: Some("https://api.example.com/api/".to_string()),
        sync_interval: Some(120),
        sync_on_resume: Some(false),
        ..ProfileUpdate::default()
    };
    apply_profile_update(&mut config, "work", &update).unwrap();
    let client = config.profile("work").unwrap().to_client_config();
    assert_eq!(client.api_base_url(), "https://api.example.com/api");
    assert_eq!(client.sync_interval(), Some(Duration::from_secs(120)));
    assert!(!client.sync_on_resume);

    let zero_timeout = ProfileUpdate {
        timeout: Some(0),
        ..ProfileUpdate::default()
    };
    assert!(apply_profile_update(&mut config, "work", &zero_timeout).is_err());
}

#[test]
fn completions_use_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("evident"));
}
