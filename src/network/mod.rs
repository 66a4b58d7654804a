//! Capability interface shared by every scheduling algorithm.
//!
//! The validator, dispatcher, repair loop and compactor are written once
//! against [`TaskNetwork`]. Two shapes implement it:
//!
//! - [`Schedule`](crate::models::Schedule), keyed by [`TaskId`](crate::models::TaskId).
//! - [`NodeGraph`], a view over diagram nodes and edges keyed by
//!   [`NodeId`](crate::models::NodeId).
//!
//! # Link Order
//! [`TaskNetwork::links`] must return constraints in a stable order
//! (insertion order for both implementations). Violation reports and the
//! repair loop follow that order, which keeps results reproducible.

mod graph;
mod schedule;

pub use graph::NodeGraph;

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::models::{Availability, Relation};

/// Scheduling-relevant view of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSlot<M> {
    /// Start time (ms).
    pub start_ms: i64,
    /// Processing time (ms).
    pub duration_ms: i64,
    /// Priority (lower value first on ties).
    pub priority: i32,
    /// Earliest permissible start (ms).
    pub release_ms: i64,
    /// Assigned machine, if any.
    pub machine: Option<M>,
}

impl<M> TaskSlot<M> {
    /// End time (ms).
    #[inline]
    pub fn end_ms(&self) -> i64 {
        self.start_ms + self.duration_ms
    }
}

/// A precedence constraint as seen by the algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<K> {
    pub predecessor: K,
    pub successor: K,
    pub relation: Relation,
    pub lag_ms: i64,
}

/// Minimal read/write surface the algorithms need.
pub trait TaskNetwork {
    /// Task identifier.
    type TaskKey: Copy + Eq + Hash + Debug + Display;
    /// Machine identifier.
    type MachineKey: Copy + Eq + Hash + Debug;

    /// Task keys in collection order.
    fn task_keys(&self) -> Vec<Self::TaskKey>;

    /// Timing data of a task, `None` if the key is unknown.
    fn slot(&self, task: Self::TaskKey) -> Option<TaskSlot<Self::MachineKey>>;

    /// Display name of a task.
    fn task_name(&self, task: Self::TaskKey) -> String;

    /// Moves a task. Implementations clamp the start at zero.
    fn set_start(&mut self, task: Self::TaskKey, start_ms: i64);

    /// Whether the machine is registered.
    fn has_machine(&self, machine: Self::MachineKey) -> bool;

    /// Availability of a machine, if it has one.
    fn availability(&self, _machine: Self::MachineKey) -> Option<&Availability> {
        None
    }

    /// Precedence constraints in stable order.
    fn links(&self) -> Vec<Link<Self::TaskKey>>;

    /// Clears every task and constraint violation flag.
    fn clear_violations(&mut self);

    /// Flags link `index` (into [`links`](Self::links)) and its successor.
    fn flag_violation(&mut self, index: usize, message: &str);

    /// Re-derives any per-task layout state after a placement.
    fn sync_row(&mut self, _task: Self::TaskKey) {}

    /// Latest task end (ms), 0 without tasks.
    fn makespan_ms(&self) -> i64 {
        self.task_keys()
            .into_iter()
            .filter_map(|k| self.slot(k))
            .map(|s| s.end_ms())
            .max()
            .unwrap_or(0)
    }
}

/// Earliest start that every constraint naming `task` as successor allows,
/// given current predecessor positions. 0 when unconstrained.
///
/// Each constraint asks for `predecessor.end + lag`, whatever its relation.
/// With `enforce_finish_relations` set, the relation's own bound is used
/// instead (see [`Relation::required_successor_start`]).
pub fn earliest_precedence_start<N: TaskNetwork>(
    net: &N,
    task: N::TaskKey,
    enforce_finish_relations: bool,
) -> i64 {
    let Some(own) = net.slot(task) else {
        return 0;
    };
    net.links()
        .iter()
        .filter(|link| link.successor == task)
        .filter_map(|link| {
            let pred = net.slot(link.predecessor)?;
            if !enforce_finish_relations {
                return Some(pred.end_ms() + link.lag_ms);
            }
            link.relation.required_successor_start(
                pred.start_ms,
                pred.duration_ms,
                own.duration_ms,
                link.lag_ms,
                true,
            )
        })
        .fold(0, i64::max)
}

/// One violated precedence constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation<K> {
    pub predecessor: K,
    pub successor: K,
    pub predecessor_name: String,
    pub successor_name: String,
    pub relation: Relation,
    pub lag_ms: i64,
    /// Predecessor end (ms).
    pub predecessor_end_ms: i64,
    /// Successor start (ms).
    pub successor_start_ms: i64,
    /// Forward shift that would satisfy the constraint (ms, ≥ 0).
    pub required_shift_ms: i64,
    pub message: String,
}

/// Result of a validation, scheduling or repair run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<K> {
    /// `true` when no precedence violation remains (and, for repair, the
    /// loop did not give up).
    pub success: bool,
    /// Human-readable status.
    pub message: String,
    /// Tasks placed by a dispatch run; 0 for other operations.
    pub tasks_scheduled: usize,
    /// Number of violations in [`violations`](Self::violations).
    pub violations_found: usize,
    /// Makespan after the operation (ms).
    pub makespan_ms: i64,
    /// Repair passes used; 0 for other operations.
    pub iterations: usize,
    /// Violations in constraint order.
    pub violations: Vec<Violation<K>>,
}

impl<K> Outcome<K> {
    /// Whether the outcome carries no violations.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}
