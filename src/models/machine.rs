//! Machine model.
//!
//! A machine is one row of the Gantt chart. It processes at most one task at
//! a time and may carry working windows and downtime.

use serde::{Deserialize, Serialize};

use super::{Availability, MachineId, TaskId};

/// A machine (shared processing resource).
///
/// The task membership list is maintained by the owning
/// [`Schedule`](super::Schedule); it is read-only from outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    id: MachineId,
    /// Display name.
    pub name: String,
    row: usize,
    /// Working windows and downtime.
    pub availability: Availability,
    task_ids: Vec<TaskId>,
}

impl Machine {
    pub(crate) fn new(id: MachineId, name: impl Into<String>, row: usize) -> Self {
        Self {
            id,
            name: name.into(),
            row,
            availability: Availability::always(),
            task_ids: Vec::new(),
        }
    }

    /// Machine identifier.
    pub fn id(&self) -> MachineId {
        self.id
    }

    /// Row position (0-based, contiguous across the schedule).
    pub fn row(&self) -> usize {
        self.row
    }

    /// Tasks assigned to this machine, in assignment order.
    pub fn task_ids(&self) -> &[TaskId] {
        &self.task_ids
    }

    /// Number of assigned tasks.
    pub fn task_count(&self) -> usize {
        self.task_ids.len()
    }

    pub(crate) fn set_row(&mut self, row: usize) {
        self.row = row;
    }

    pub(crate) fn attach(&mut self, task: TaskId) {
        if !self.task_ids.contains(&task) {
            self.task_ids.push(task);
        }
    }

    pub(crate) fn detach(&mut self, task: TaskId) {
        self.task_ids.retain(|&t| t != task);
    }
}
