use evident_core::TimeWindow;

use crate::commands::common::{format_pending_line, format_view_lines, Context};
use crate::error::CliError;

pub async fn run_list(window: TimeWindow, as_json: bool, context: &Context) -> Result<(), CliError> {
    let coordinator = context.open_coordinator().await?;
    let view = coordinator.refresh(window).await?;

    if let Some(notice) = &view.notice {
        eprintln!("{notice}");
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view.entries)?);
    } else {
        println!("{}", view.window.label());
        for line in format_view_lines(&view) {
            println!("{line}");
        }
    }

    Ok(())
}

pub async fn run_pending(as_json: bool, context: &Context) -> Result<(), CliError> {
    let coordinator = context.open_coordinator().await?;
    let pending = coordinator.store().list_unsynced().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
        return Ok(());
    }

    if pending.is_empty() {
        println!("No logs waiting to sync.");
        return Ok(());
    }

    for entry in &pending {
        println!("{}", format_pending_line(entry));
    }
    Ok(())
}
