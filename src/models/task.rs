//! Task model.
//!
//! A task is one bar on the Gantt chart: a single operation of a job,
//! processed on one machine for a fixed duration.
//!
//! # Time Representation
//! All times are in milliseconds relative to the schedule epoch (t=0).
//! End time is derived (`start + duration`) and never stored, so the two
//! cannot drift apart.

use serde::{Deserialize, Serialize};

use super::{JobId, MachineId, TaskId};

/// A task (operation) to be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    /// Display name.
    pub name: String,
    job_id: JobId,
    machine_id: Option<MachineId>,
    start_ms: i64,
    duration_ms: i64,
    /// Setup time preceding processing (ms). Informational.
    pub setup_ms: i64,
    percent_complete: f64,
    /// Priority (lower value = dispatched first on ties).
    pub priority: i32,
    violating: bool,
    critical: bool,
    row: usize,
}

impl Task {
    pub(crate) fn from_draft(id: TaskId, draft: NewTask, row: usize) -> Self {
        let mut task = Self {
            id,
            name: draft.name,
            job_id: draft.job_id,
            machine_id: draft.machine_id,
            start_ms: 0,
            duration_ms: draft.duration_ms.max(0),
            setup_ms: draft.setup_ms,
            percent_complete: 0.0,
            priority: draft.priority,
            violating: false,
            critical: false,
            row,
        };
        task.set_start_ms(draft.start_ms);
        task
    }

    /// Task identifier.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Owning job.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Assigned machine, `None` when unassigned.
    pub fn machine_id(&self) -> Option<MachineId> {
        self.machine_id
    }

    /// Start time (ms).
    #[inline]
    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// Processing time (ms).
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    /// End time (ms): `start + duration`.
    #[inline]
    pub fn end_ms(&self) -> i64 {
        self.start_ms + self.duration_ms
    }

    /// Completion percentage in `0.0..=100.0`.
    pub fn percent_complete(&self) -> f64 {
        self.percent_complete
    }

    /// Whether the last validation flagged this task.
    pub fn is_violating(&self) -> bool {
        self.violating
    }

    /// Whether the task lies on the critical chain.
    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Row index, mirroring the assigned machine's row.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Sets the start time, clamped at zero. Duration is kept.
    pub fn set_start_ms(&mut self, start_ms: i64) {
        self.start_ms = start_ms.max(0);
    }

    /// Sets the end time by recomputing the duration (never negative).
    pub fn set_end_ms(&mut self, end_ms: i64) {
        self.duration_ms = (end_ms - self.start_ms).max(0);
    }

    /// Sets the duration (never negative). Start is kept.
    pub fn set_duration_ms(&mut self, duration_ms: i64) {
        self.duration_ms = duration_ms.max(0);
    }

    /// Moves the task by `delta_ms`, clamping the start at zero.
    pub fn shift_by(&mut self, delta_ms: i64) {
        self.set_start_ms(self.start_ms.saturating_add(delta_ms));
    }

    /// Sets the completion percentage, clamped to `0.0..=100.0`.
    pub fn set_percent_complete(&mut self, percent: f64) {
        self.percent_complete = percent.clamp(0.0, 100.0);
    }

    pub(crate) fn set_machine(&mut self, machine_id: Option<MachineId>, row: usize) {
        self.machine_id = machine_id;
        self.row = row;
    }

    pub(crate) fn set_row(&mut self, row: usize) {
        self.row = row;
    }

    pub(crate) fn set_violating(&mut self, violating: bool) {
        self.violating = violating;
    }

    pub(crate) fn set_critical(&mut self, critical: bool) {
        self.critical = critical;
    }
}

/// Parameters for [`Schedule::add_task`](super::Schedule::add_task).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub job_id: JobId,
    pub machine_id: Option<MachineId>,
    pub start_ms: i64,
    pub duration_ms: i64,
    pub setup_ms: i64,
    pub priority: i32,
}

impl NewTask {
    /// An unassigned task of `job_id` starting at t=0.
    pub fn new(name: impl Into<String>, job_id: JobId, duration_ms: i64) -> Self {
        Self {
            name: name.into(),
            job_id,
            machine_id: None,
            start_ms: 0,
            duration_ms,
            setup_ms: 0,
            priority: 0,
        }
    }

    /// Assigns the task to a machine.
    pub fn on_machine(mut self, machine_id: MachineId) -> Self {
        self.machine_id = Some(machine_id);
        self
    }

    /// Sets the initial start time (ms).
    pub fn starting_at(mut self, start_ms: i64) -> Self {
        self.start_ms = start_ms;
        self
    }

    /// Sets the setup time (ms).
    pub fn with_setup(mut self, setup_ms: i64) -> Self {
        self.setup_ms = setup_ms;
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
