use chrono::Local;
use evident_core::{NewLog, RecordOutcome};

use crate::cli::AddArgs;
use crate::commands::common::{normalize_description, Context};
use crate::error::CliError;

pub async fn run_add(args: AddArgs, context: &Context) -> Result<(), CliError> {
    let description = normalize_description(&args.description)?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let mut log = NewLog::new(date, args.start, args.end, args.activity, description);
    if let Some(reference) = args.reference {
        log = log.with_reference(reference);
    }

    let coordinator = context.open_coordinator().await?;
    let outcome = coordinator.record_log(log).await?;

    if args.json {
        let json = match &outcome {
            RecordOutcome::Confirmed(entry) => serde_json::json!({
                "status": "confirmed",
                "log": entry,
            }),
            RecordOutcome::Queued(entry) => serde_json::json!({
                "status": "queued",
                "log": entry,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    match outcome {
        RecordOutcome::Confirmed(entry) => println!("{}", entry.id),
        RecordOutcome::Queued(entry) => {
            println!("{}", entry.local_id);
            eprintln!("Saved on this device; it will sync when the log service is reachable.");
        }
    }
    Ok(())
}
