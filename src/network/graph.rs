//! [`TaskNetwork`] over diagram nodes and edges.

use std::collections::HashMap;

use super::{Link, TaskNetwork, TaskSlot};
use crate::models::{Edge, Node, NodeId, NodeKind, Relation};

/// Mutable view of a node/edge diagram as a task network.
///
/// Only edges between two distinct task nodes become constraints; every such
/// edge is finish-to-start with zero lag. When node ids repeat, the first
/// node with a given id wins.
#[derive(Debug)]
pub struct NodeGraph<'a> {
    nodes: &'a mut [Node],
    edges: &'a mut [Edge],
    index: HashMap<NodeId, usize>,
    /// Indices into `edges` of the edges that act as constraints.
    link_edges: Vec<usize>,
}

impl<'a> NodeGraph<'a> {
    /// Builds the view.
    pub fn new(nodes: &'a mut [Node], edges: &'a mut [Edge]) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.id).or_insert(i);
        }

        let is_task = |id: NodeId| {
            index
                .get(&id)
                .is_some_and(|&i| nodes[i].kind == NodeKind::Task)
        };
        let link_edges = edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.from != e.to && is_task(e.from) && is_task(e.to))
            .map(|(i, _)| i)
            .collect();

        Self {
            nodes,
            edges,
            index,
            link_edges,
        }
    }

    fn task_node(&self, id: NodeId) -> Option<&Node> {
        let &i = self.index.get(&id)?;
        let node = &self.nodes[i];
        node.is_task().then_some(node)
    }
}

impl TaskNetwork for NodeGraph<'_> {
    type TaskKey = NodeId;
    type MachineKey = NodeId;

    fn task_keys(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| n.is_task() && self.index.get(&n.id) == Some(i))
            .map(|(_, n)| n.id)
            .collect()
    }

    fn slot(&self, task: NodeId) -> Option<TaskSlot<NodeId>> {
        let node = self.task_node(task)?;
        Some(TaskSlot {
            start_ms: node.start_ms,
            duration_ms: node.duration_ms,
            priority: node.priority,
            release_ms: 0,
            machine: node.machine,
        })
    }

    fn task_name(&self, task: NodeId) -> String {
        self.task_node(task)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| task.to_string())
    }

    fn set_start(&mut self, task: NodeId, start_ms: i64) {
        if let Some(&i) = self.index.get(&task) {
            if self.nodes[i].is_task() {
                self.nodes[i].start_ms = start_ms.max(0);
            }
        }
    }

    fn has_machine(&self, machine: NodeId) -> bool {
        self.index
            .get(&machine)
            .is_some_and(|&i| self.nodes[i].kind == NodeKind::Machine)
    }

    fn links(&self) -> Vec<Link<NodeId>> {
        self.link_edges
            .iter()
            .map(|&i| Link {
                predecessor: self.edges[i].from,
                successor: self.edges[i].to,
                relation: Relation::FinishToStart,
                lag_ms: 0,
            })
            .collect()
    }

    fn clear_violations(&mut self) {
        for node in self.nodes.iter_mut() {
            node.violating = false;
        }
        for edge in self.edges.iter_mut() {
            edge.violating = false;
            edge.message = None;
        }
    }

    fn flag_violation(&mut self, index: usize, message: &str) {
        let Some(&edge_index) = self.link_edges.get(index) else {
            return;
        };
        let edge = &mut self.edges[edge_index];
        edge.violating = true;
        edge.message = Some(message.to_string());
        let successor = edge.to;
        if let Some(&i) = self.index.get(&successor) {
            self.nodes[i].violating = true;
        }
    }
}
