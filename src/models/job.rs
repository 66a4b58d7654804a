//! Job model.
//!
//! A job groups tasks that belong to one order. It carries the release and
//! due times the KPIs are measured against.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use serde::{Deserialize, Serialize};

use super::{JobId, TaskId};

/// A job (order) owning one or more tasks.
///
/// Completion, flow time and tardiness are derived from the tasks, see
/// [`Schedule::job_completion_ms`](super::Schedule::job_completion_ms).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    /// Display name.
    pub name: String,
    /// Display color shared by all tasks of the job (e.g. `"#4f81bd"`).
    pub color: String,
    /// Priority (lower value = more urgent).
    pub priority: i32,
    /// Earliest permissible start of any task (ms).
    pub release_ms: i64,
    /// Due time (ms). `None` = no due date.
    pub due_ms: Option<i64>,
    /// Weight for weighted tardiness.
    pub weight: f64,
    task_ids: Vec<TaskId>,
}

impl Job {
    pub(crate) fn from_draft(id: JobId, draft: NewJob) -> Self {
        Self {
            id,
            name: draft.name,
            color: draft.color,
            priority: draft.priority,
            release_ms: draft.release_ms,
            due_ms: draft.due_ms,
            weight: draft.weight,
            task_ids: Vec::new(),
        }
    }

    /// Job identifier.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Tasks owned by this job, in creation order.
    pub fn task_ids(&self) -> &[TaskId] {
        &self.task_ids
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

/// Parameters for [`Schedule::add_job`](super::Schedule::add_job).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
    pub name: String,
    pub color: String,
    pub priority: i32,
    pub release_ms: i64,
    pub due_ms: Option<i64>,
    pub weight: f64,
}

impl NewJob {
    /// A job released at t=0 with weight 1 and no due date.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: String::from("#4f81bd"),
            priority: 0,
            release_ms: 0,
            due_ms: None,
            weight: 1.0,
        }
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the release time (ms).
    pub fn with_release(mut self, release_ms: i64) -> Self {
        self.release_ms = release_ms;
        self
    }

    /// Sets the due time (ms).
    pub fn with_due(mut self, due_ms: i64) -> Self {
        self.due_ms = Some(due_ms);
        self
    }

    /// Sets the tardiness weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}
