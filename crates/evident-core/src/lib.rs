//! evident-core - Core library for Evident
//!
//! Offline-first time logging: logs are queued in a local store, pushed to
//! the Evident log service when a credential is available, and shown as one
//! merged list of confirmed and pending entries.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod projection;
pub mod session;
pub mod state;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, ErrorKind, Result};
pub use gateway::{Credential, HttpLogGateway, RemoteLogGateway};
pub use models::{LocalId, LogEntry, NewLog, PendingLogEntry, TimeWindow};
pub use projection::{LogRef, LogView};
pub use session::SessionContext;
pub use state::{SyncOutcome, SyncReport, SyncState};
pub use store::LocalLogStore;
pub use sync::{RecordOutcome, SyncCoordinator};
