//! Dispatching rules.
//!
//! A rule turns the tasks' processing times and priority values into a
//! dispatch order. Sorting is stable, so tasks tied on every key keep their
//! collection order.
//!
//! # Usage
//!
//! ```
//! use u_gantt::dispatching::{DispatchRule, RuleInput};
//!
//! let inputs = [
//!     RuleInput { duration_ms: 300, priority: 0 },
//!     RuleInput { duration_ms: 100, priority: 0 },
//! ];
//! assert_eq!(DispatchRule::Spt.order(&inputs), vec![1, 0]);
//! assert_eq!(DispatchRule::Fifo.order(&inputs), vec![0, 1]);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

/// What a rule may look at when ordering a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInput {
    /// Processing time (ms).
    pub duration_ms: i64,
    /// Priority value. Lower is dispatched first among equal durations.
    pub priority: i32,
}

/// The dispatch policies the scheduler offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DispatchRule {
    /// Shortest processing time first, ties by ascending priority value.
    Spt,
    /// Longest processing time first, ties by ascending priority value.
    Lpt,
    /// Collection order.
    #[default]
    Fifo,
}

impl DispatchRule {
    /// Returns indices into `tasks` in dispatch order.
    pub fn order(self, tasks: &[RuleInput]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..tasks.len()).collect();
        match self {
            Self::Spt => indices.sort_by_key(|&i| (tasks[i].duration_ms, tasks[i].priority)),
            Self::Lpt => {
                indices.sort_by_key(|&i| (Reverse(tasks[i].duration_ms), tasks[i].priority))
            }
            Self::Fifo => {}
        }
        indices
    }

    /// Short name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Spt => "SPT",
            Self::Lpt => "LPT",
            Self::Fifo => "FIFO",
        }
    }
}
