//! Generic diagram nodes and edges.
//!
//! The editor can also express a schedule as free-form nodes connected by
//! arrows. Nodes tagged [`NodeKind::Task`] are tasks, nodes tagged
//! [`NodeKind::Machine`] are machines, and every edge `from -> to` between two
//! task nodes is a finish-to-start constraint with zero lag.

use serde::{Deserialize, Serialize};

use super::{EdgeId, NodeId};

/// Role of a diagram node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A schedulable task bar.
    Task,
    /// A machine lane.
    Machine,
    /// Anything else (labels, notes); ignored by the engine.
    Other,
}

/// A diagram node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    /// Start time (ms). Meaningful for task nodes.
    pub start_ms: i64,
    /// Duration (ms). Meaningful for task nodes.
    pub duration_ms: i64,
    pub priority: i32,
    /// Machine node this task runs on.
    pub machine: Option<NodeId>,
    /// Set by validation.
    pub violating: bool,
}

impl Node {
    /// Creates a task node.
    pub fn task(id: u64, label: impl Into<String>, duration_ms: i64) -> Self {
        Self {
            id: NodeId(id),
            label: label.into(),
            kind: NodeKind::Task,
            start_ms: 0,
            duration_ms: duration_ms.max(0),
            priority: 0,
            machine: None,
            violating: false,
        }
    }

    /// Creates a machine node.
    pub fn machine(id: u64, label: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Machine,
            ..Self::task(id, label, 0)
        }
    }

    /// Creates a node the engine ignores.
    pub fn other(id: u64, label: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Other,
            ..Self::task(id, label, 0)
        }
    }

    /// Places the task node on a machine node.
    pub fn on_machine(mut self, machine: u64) -> Self {
        self.machine = Some(NodeId(machine));
        self
    }

    /// Sets the start time (ms, clamped at zero).
    pub fn starting_at(mut self, start_ms: i64) -> Self {
        self.start_ms = start_ms.max(0);
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// End time (ms).
    #[inline]
    pub fn end_ms(&self) -> i64 {
        self.start_ms + self.duration_ms
    }

    /// Whether the node is a task.
    pub fn is_task(&self) -> bool {
        self.kind == NodeKind::Task
    }
}

/// A directed diagram edge: `from` must finish before `to` starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    /// Set by validation.
    pub violating: bool,
    /// Set by validation.
    pub message: Option<String>,
}

impl Edge {
    /// Creates an edge `from -> to`.
    pub fn new(id: u64, from: u64, to: u64) -> Self {
        Self {
            id: EdgeId(id),
            from: NodeId(from),
            to: NodeId(to),
            violating: false,
            message: None,
        }
    }
}
