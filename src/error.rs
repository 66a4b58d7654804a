//! Errors raised by schedule mutations.
//!
//! Only operations that would otherwise break referential integrity fail.
//! Scheduling outcomes (violations, skipped tasks, repair exhaustion) are
//! reported as data in [`Outcome`](crate::network::Outcome), never as errors.

use thiserror::Error;

use crate::models::{JobId, MachineId, PrecedenceId, TaskId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Machine not found: {0}")]
    UnknownMachine(MachineId),

    #[error("Job not found: {0}")]
    UnknownJob(JobId),

    #[error("Task not found: {0}")]
    UnknownTask(TaskId),

    #[error("Precedence not found: {0}")]
    UnknownPrecedence(PrecedenceId),

    #[error("Task {0} cannot precede itself")]
    SelfPrecedence(TaskId),

    #[error("Duration must not be negative (got {0} ms)")]
    NegativeDuration(i64),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
