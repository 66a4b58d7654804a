//! Critical chain marking.
//!
//! A task is critical when delaying it delays the makespan. Starting from
//! every task that ends at the makespan, walk backwards over tight links:
//!
//! - a finish-to-start predecessor whose end + lag equals the task's start;
//! - the task on the same machine that ends exactly at the task's start.
//!
//! Every task reached is flagged.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{Relation, Schedule, TaskId};

/// Clears and recomputes the critical flag of every task. Returns the number
/// of tasks flagged.
pub fn mark_critical_chain(schedule: &mut Schedule) -> usize {
    for task in schedule.tasks_mut() {
        task.set_critical(false);
    }
    if schedule.tasks().is_empty() {
        return 0;
    }

    let makespan = schedule.makespan_ms();
    let mut stack: Vec<TaskId> = schedule
        .tasks()
        .iter()
        .filter(|t| t.end_ms() == makespan)
        .map(|t| t.id())
        .collect();
    let mut critical = HashSet::new();

    while let Some(id) = stack.pop() {
        if !critical.insert(id) {
            continue;
        }
        let Some(task) = schedule.task(id) else {
            continue;
        };
        let start = task.start_ms();

        for link in schedule.predecessors_of(id) {
            if link.relation != Relation::FinishToStart {
                continue;
            }
            if let Some(pred) = schedule.task(link.predecessor()) {
                if pred.end_ms() + link.lag_ms == start {
                    stack.push(pred.id());
                }
            }
        }
        if let Some(machine) = task.machine_id() {
            stack.extend(
                schedule
                    .tasks_on_machine(machine)
                    .into_iter()
                    .filter(|other| other.id() != id && other.end_ms() == start)
                    .map(|other| other.id()),
            );
        }
    }

    for &id in &critical {
        if let Some(index) = schedule.task_index(id) {
            schedule.task_at_mut(index).set_critical(true);
        }
    }
    debug!(critical = critical.len(), makespan, "critical chain marked");
    critical.len()
}
