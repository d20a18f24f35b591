use evident_core::LogRef;

use crate::commands::common::{normalize_log_identifier, Context};
use crate::error::CliError;

pub async fn run_delete(id: &str, context: &Context) -> Result<(), CliError> {
    let normalized_id = normalize_log_identifier(id)?;
    let target =
        LogRef::parse(&normalized_id).ok_or_else(|| CliError::InvalidLogId(normalized_id.clone()))?;

    let coordinator = context.open_coordinator().await?;
    if !coordinator.delete(&target).await? {
        return Err(CliError::LogNotFound(normalized_id));
    }

    println!("{target}");
    Ok(())
}
