//! Precedence constraints between tasks.
//!
//! # Reference
//! Brucker (2007), "Scheduling Algorithms", Ch. 2 (generalized precedence)

use serde::{Deserialize, Serialize};

use super::{PrecedenceId, TaskId};

/// How a predecessor's and successor's endpoints are related.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Relation {
    /// Successor starts after predecessor finishes.
    #[default]
    FinishToStart,
    /// Successor starts after predecessor starts.
    StartToStart,
    /// Successor finishes after predecessor finishes.
    FinishToFinish,
    /// Successor finishes after predecessor starts.
    StartToFinish,
}

impl Relation {
    /// Short label (`FS`, `SS`, `FF`, `SF`).
    pub fn code(self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }

    /// Whether the constraint binds the successor's finish rather than its start.
    pub fn binds_successor_finish(self) -> bool {
        matches!(self, Self::FinishToFinish | Self::StartToFinish)
    }

    /// Earliest start the successor may take.
    ///
    /// Returns `None` for finish-bound relations unless `enforce_finish` is
    /// set; those are then informational and always satisfied.
    pub fn required_successor_start(
        self,
        predecessor_start_ms: i64,
        predecessor_duration_ms: i64,
        successor_duration_ms: i64,
        lag_ms: i64,
        enforce_finish: bool,
    ) -> Option<i64> {
        let predecessor_end_ms = predecessor_start_ms + predecessor_duration_ms;
        match self {
            Self::FinishToStart => Some(predecessor_end_ms + lag_ms),
            Self::StartToStart => Some(predecessor_start_ms + lag_ms),
            Self::FinishToFinish if enforce_finish => {
                Some(predecessor_end_ms + lag_ms - successor_duration_ms)
            }
            Self::StartToFinish if enforce_finish => {
                Some(predecessor_start_ms + lag_ms - successor_duration_ms)
            }
            Self::FinishToFinish | Self::StartToFinish => None,
        }
    }
}

/// A precedence constraint: `successor` waits on `predecessor` plus `lag_ms`.
///
/// A positive lag is a required delay; a negative lag permits overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Precedence {
    id: PrecedenceId,
    predecessor: TaskId,
    successor: TaskId,
    /// Endpoint relation.
    pub relation: Relation,
    /// Lag (ms).
    pub lag_ms: i64,
    violating: bool,
    message: Option<String>,
}

impl Precedence {
    pub(crate) fn new(
        id: PrecedenceId,
        predecessor: TaskId,
        successor: TaskId,
        relation: Relation,
        lag_ms: i64,
    ) -> Self {
        Self {
            id,
            predecessor,
            successor,
            relation,
            lag_ms,
            violating: false,
            message: None,
        }
    }

    /// Constraint identifier.
    pub fn id(&self) -> PrecedenceId {
        self.id
    }

    /// Task that must come first.
    pub fn predecessor(&self) -> TaskId {
        self.predecessor
    }

    /// Task that must wait.
    pub fn successor(&self) -> TaskId {
        self.successor
    }

    /// Whether the last validation found this constraint violated.
    pub fn is_violating(&self) -> bool {
        self.violating
    }

    /// Violation message from the last validation.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether the constraint touches `task` on either side.
    pub fn involves(&self, task: TaskId) -> bool {
        self.predecessor == task || self.successor == task
    }

    pub(crate) fn set_violation(&mut self, message: Option<String>) {
        self.violating = message.is_some();
        self.message = message;
    }
}
