use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use evident_core::models::ActivityType;
use evident_core::TimeWindow;

#[derive(Parser)]
#[command(name = "evident")]
#[command(about = "Log field work from the command line, online or offline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name (API endpoint and stored session)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a time log
    #[command(alias = "new")]
    Add(AddArgs),
    /// Show logs for a time window
    List {
        /// today, this-week or last-week
        #[arg(default_value = "today")]
        window: TimeWindow,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show logs waiting to be synced
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Push queued logs to the log service
    Sync,
    /// Keep syncing on an interval until interrupted
    Watch {
        /// Seconds between rounds (defaults to the profile setting)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
    /// Delete a log by its id (queued `local_…` ids never touch the network)
    Delete {
        /// Log ID
        id: String,
    },
    /// Generate a text summary for a time window
    Summary {
        /// today, this-week or last-week
        #[arg(default_value = "this-week")]
        window: TimeWindow,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Sign in to the log service
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// What was done
    pub description: Vec<String>,
    /// Start time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    pub start: NaiveTime,
    /// End time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    pub end: NaiveTime,
    /// Day of the work (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// work, meeting, field, travel or admin
    #[arg(short, long, default_value = "work")]
    pub activity: ActivityType,
    /// Job number, ticket or site reference
    #[arg(long)]
    pub reference: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration for a profile
    Show,
    /// Update profile settings
    Set {
        /// Log service base URL (e.g. <https://api.example.com/api>)
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Periodic sync interval in seconds (0 disables)
        #[arg(long, value_name = "SECS")]
        sync_interval: Option<u64>,
        /// Sync whenever the client resumes
        #[arg(long, value_name = "BOOL")]
        sync_on_resume: Option<bool>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Make a profile the active one
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in and store the session in the keychain
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for the profile
    Status,
    /// Sign out and clear the stored session (queued logs are kept)
    Logout,
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{raw}' (expected HH:MM)"))
}
