//! Error types for the scheduler.
//!
//! Rejected admissions, failing actions and invalid cancellations are normal
//! outcomes and are reported through return values, not through this type.

use std::time::Duration;

/// Errors raised by the scheduler's setup and scheduling calls.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// `start` was called outside of a tokio runtime.
    #[error("no tokio runtime is available to host the background driver")]
    NoRuntime,

    /// `start` was called while the background driver is already running.
    #[error("the background driver is already running")]
    AlreadyRunning,

    /// A delay too large to be added to a calendar timestamp.
    #[error("delay of {0:?} cannot be represented as a calendar offset")]
    DelayOutOfRange(Duration),

    /// A string that names no execution target.
    #[error("unknown execution target: {0}")]
    UnknownTarget(String),

    /// Loading the scheduler configuration failed.
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
