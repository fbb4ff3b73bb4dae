//! Scheduler error types

use thiserror::Error;

/// Scheduling errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler was shut down and no longer accepts timers
    #[error("scheduler has been shut down")]
    ShutDown,
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;
