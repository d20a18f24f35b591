use std::time::Duration;

use evident_core::SyncState;

use crate::commands::common::{describe_outcome, Context};
use crate::error::CliError;

const DEFAULT_WATCH_INTERVAL_SECS: u64 = 300;

pub async fn run_sync(context: &Context) -> Result<(), CliError> {
    let coordinator = context.open_coordinator().await?;
    let outcome = coordinator.sync_pending().await;
    println!("{}", describe_outcome(&outcome));
    Ok(())
}

pub async fn run_watch(interval_secs: Option<u64>, context: &Context) -> Result<(), CliError> {
    let every = watch_interval(interval_secs, context.config.sync_interval());
    let coordinator = context.open_coordinator().await?;

    let mut reports = coordinator.subscribe();
    let printer = async {
        while reports.changed().await.is_ok() {
            let report = reports.borrow_and_update().clone();
            if report.state != SyncState::Idle {
                continue;
            }
            if let Some(outcome) = report.last_outcome {
                println!("{}", describe_outcome(&outcome));
            }
        }
    };
    let shutdown = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    println!("Syncing every {}s; press Ctrl-C to stop.", every.as_secs());
    tokio::select! {
        () = coordinator.run_periodic(every, shutdown) => {}
        () = printer => {}
    }
    Ok(())
}

pub fn watch_interval(explicit_secs: Option<u64>, configured: Option<Duration>) -> Duration {
    explicit_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .or(configured)
        .unwrap_or(Duration::from_secs(DEFAULT_WATCH_INTERVAL_SECS))
}
