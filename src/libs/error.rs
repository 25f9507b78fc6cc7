//! Error types for the timer synchronization core.
//!
//! The library layer reports failures through [`TimerError`]; the command
//! layer converts them into `anyhow` errors for display. Persistence failures
//! inside the keeper's heartbeat are never propagated as fatal; they are
//! logged and retried on the next tick.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimerError {
    /// Start was requested for a task id the task registry does not know.
    #[error("unknown task id: {0}")]
    Validation(String),

    /// A read or write against the timer state slot or the entry ledger failed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// A synchronization message was malformed and has been dropped.
    #[error("malformed sync message: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, TimerError>;
