//! Evident CLI - log field work from the terminal
//!
//! Logs are saved on this device first and pushed to the log service
//! whenever a signed-in profile can reach it.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::Context;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::list::{run_list, run_pending};
use crate::commands::summary::run_summary;
use crate::commands::sync::{run_sync, run_watch};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "evident=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let db_path = cli.db_path;
    match command {
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
        Commands::Config { command } => run_config(command, profile),
        Commands::Add(args) => run_add(args, &Context::resolve(profile, db_path)?).await,
        Commands::List { window, json } => {
            run_list(window, json, &Context::resolve(profile, db_path)?).await
        }
        Commands::Pending { json } => run_pending(json, &Context::resolve(profile, db_path)?).await,
        Commands::Sync => run_sync(&Context::resolve(profile, db_path)?).await,
        Commands::Watch { interval } => {
            run_watch(interval, &Context::resolve(profile, db_path)?).await
        }
        Commands::Delete { id } => run_delete(&id, &Context::resolve(profile, db_path)?).await,
        Commands::Summary { window, output } => {
            let context = Context::resolve(profile, db_path)?;
            run_summary(window, output.as_deref(), &context).await
        }
        Commands::Auth { command } => run_auth(command, &Context::resolve(profile, db_path)?).await,
    }
}

#[cfg(test)]
mod tests;
