use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] evident_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No log description provided")]
    EmptyDescription,
    #[error("Log ID cannot be empty")]
    EmptyLogId,
    #[error("Not a valid log id: {0}")]
    InvalidLogId(String),
    #[error("Nothing was deleted for id {0}")]
    LogNotFound(String),
    #[error("Export not available: {0}")]
    ExportNotAllowed(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
