//! Error types for evident-core

use serde::Serialize;
use thiserror::Error;

/// Result type alias using evident-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in evident-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before it reached storage or the network
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A remote action was attempted without a credential
    #[error("Sign in required: {0}")]
    AuthRequired(&'static str),

    /// Transport failure or timeout talking to the log service
    #[error("Network error: {0}")]
    Network(String),

    /// The log service rejected the credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The log service answered with a failure or an unreadable payload
    #[error("Server error: {0}")]
    Server(String),

    /// Local persistence failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification used to apply the failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Validation,
    AuthRequired,
    Network,
    Unauthorized,
    Server,
    Storage,
    Config,
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::AuthRequired(_) => ErrorKind::AuthRequired,
            Self::Network(_) => ErrorKind::Network,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Server(_) => ErrorKind::Server,
            Self::Storage(_) | Self::LibSql(_) | Self::Io(_) | Self::Serialization(_) => {
                ErrorKind::Storage
            }
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the failure came from talking to the remote service.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Network | ErrorKind::Unauthorized | ErrorKind::Server
        )
    }
}
