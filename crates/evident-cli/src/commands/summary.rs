use std::path::Path;

use evident_core::TimeWindow;

use crate::commands::common::{write_output, Context};
use crate::error::CliError;

pub async fn run_summary(
    window: TimeWindow,
    output_path: Option<&Path>,
    context: &Context,
) -> Result<(), CliError> {
    let coordinator = context.open_coordinator().await?;

    let permission = coordinator.export_permission().await?;
    if !permission.allowed {
        return Err(CliError::ExportNotAllowed(permission.reason.unwrap_or_else(
            || "this account cannot export more summaries".to_string(),
        )));
    }

    let summary = coordinator.generate_summary(window).await?;
    tracing::debug!(
        id = %summary.id,
        logs = summary.log_count,
        "Generated summary"
    );
    write_output(output_path, &summary.text_content)
}
