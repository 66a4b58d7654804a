//! [`TaskNetwork`] over the schedule aggregate.

use super::{Link, TaskNetwork, TaskSlot};
use crate::models::{Availability, MachineId, Schedule, TaskId};

impl TaskNetwork for Schedule {
    type TaskKey = TaskId;
    type MachineKey = MachineId;

    fn task_keys(&self) -> Vec<TaskId> {
        self.tasks().iter().map(|t| t.id()).collect()
    }

    fn slot(&self, task: TaskId) -> Option<TaskSlot<MachineId>> {
        let t = self.task(task)?;
        let release_ms = self.job(t.job_id()).map_or(0, |j| j.release_ms);
        Some(TaskSlot {
            start_ms: t.start_ms(),
            duration_ms: t.duration_ms(),
            priority: t.priority,
            release_ms,
            machine: t.machine_id(),
        })
    }

    fn task_name(&self, task: TaskId) -> String {
        self.task(task)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| task.to_string())
    }

    fn set_start(&mut self, task: TaskId, start_ms: i64) {
        if let Some(t) = self.task_mut(task) {
            t.set_start_ms(start_ms);
        }
    }

    fn has_machine(&self, machine: MachineId) -> bool {
        self.machine(machine).is_some()
    }

    fn availability(&self, machine: MachineId) -> Option<&Availability> {
        self.machine(machine).map(|m| &m.availability)
    }

    fn links(&self) -> Vec<Link<TaskId>> {
        self.precedences()
            .iter()
            .map(|p| Link {
                predecessor: p.predecessor(),
                successor: p.successor(),
                relation: p.relation,
                lag_ms: p.lag_ms,
            })
            .collect()
    }

    fn clear_violations(&mut self) {
        for task in self.tasks_mut() {
            task.set_violating(false);
        }
        for index in 0..self.precedences().len() {
            self.precedence_at_mut(index).set_violation(None);
        }
    }

    fn flag_violation(&mut self, index: usize, message: &str) {
        if index >= self.precedences().len() {
            return;
        }
        let successor = self.precedences()[index].successor();
        self.precedence_at_mut(index)
            .set_violation(Some(message.to_string()));
        if let Some(task_index) = self.task_index(successor) {
            self.task_at_mut(task_index).set_violating(true);
        }
    }

    fn sync_row(&mut self, task: TaskId) {
        let row = self
            .task(task)
            .and_then(|t| t.machine_id())
            .and_then(|m| self.machine(m))
            .map(|m| m.row());
        if let (Some(row), Some(t)) = (row, self.task_mut(task)) {
            t.set_row(row);
        }
    }

    fn makespan_ms(&self) -> i64 {
        Schedule::makespan_ms(self)
    }
}
