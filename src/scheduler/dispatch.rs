//! Dispatch-rule scheduler.
//!
//! # Algorithm
//!
//! 1. Order tasks by the dispatch rule (SPT, LPT or FIFO).
//! 2. Keep a "next available" time per machine, starting at 0.
//! 3. For each task in order: start = max(machine ready, predecessor ready,
//!    release), pushed past machine downtime / outside working windows.
//!    Predecessor ready is the latest predecessor end + lag.
//! 4. Advance the machine to the task's end.
//! 5. Validate and report.
//!
//! Single forward pass, no backtracking. A predecessor dispatched after its
//! successor leaves a violation; it is reported, not fixed (see
//! [`RepairEngine`](super::RepairEngine)).
//!
//! # Complexity
//! O(n log n + n·p) where n = tasks, p = constraints.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dispatching::{DispatchRule, RuleInput};
use crate::models::{Edge, Node, NodeId};
use crate::network::{earliest_precedence_start, NodeGraph, Outcome, TaskNetwork};
use crate::time::format_clock;
use crate::validation::PrecedenceValidator;

/// Places every task once, in dispatch-rule order.
///
/// # Example
///
/// ```
/// use u_gantt::dispatching::DispatchRule;
/// use u_gantt::models::{NewJob, NewTask, Schedule};
/// use u_gantt::scheduler::DispatchScheduler;
///
/// let mut schedule = Schedule::new();
/// let m = schedule.add_machine("Lathe");
/// let j = schedule.add_job(NewJob::new("Order 1"));
/// schedule.add_task(NewTask::new("long", j, 3_000).on_machine(m)).unwrap();
/// schedule.add_task(NewTask::new("short", j, 1_000).on_machine(m)).unwrap();
///
/// let outcome = DispatchScheduler::new(DispatchRule::Spt).schedule(&mut schedule);
/// assert!(outcome.success);
/// assert_eq!(outcome.tasks_scheduled, 2);
/// assert_eq!(outcome.makespan_ms, 4_000);
/// ```
#[derive(Debug, Clone)]
pub struct DispatchScheduler {
    rule: DispatchRule,
    validator: PrecedenceValidator,
    respect_machine_calendars: bool,
}

impl DispatchScheduler {
    /// Creates a scheduler for the given rule.
    pub fn new(rule: DispatchRule) -> Self {
        Self {
            rule,
            validator: PrecedenceValidator::new(),
            respect_machine_calendars: true,
        }
    }

    /// Sets the validator (and with it the relation semantics).
    pub fn with_validator(mut self, validator: PrecedenceValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Enables or disables machine calendar handling.
    pub fn with_machine_calendars(mut self, respected: bool) -> Self {
        self.respect_machine_calendars = respected;
        self
    }

    /// The dispatch rule in use.
    pub fn rule(&self) -> DispatchRule {
        self.rule
    }

    /// Assigns start times to all tasks of `net`.
    ///
    /// Tasks without a registered machine, or that fit nowhere in their
    /// machine's calendar, are left where they are and not counted.
    pub fn schedule<N: TaskNetwork>(&self, net: &mut N) -> Outcome<N::TaskKey> {
        let keys = net.task_keys();
        let inputs: Vec<RuleInput> = keys
            .iter()
            .map(|&key| {
                let slot = net.slot(key);
                RuleInput {
                    duration_ms: slot.map_or(0, |s| s.duration_ms),
                    priority: slot.map_or(0, |s| s.priority),
                }
            })
            .collect();
        let order = self.rule.order(&inputs);

        let mut machine_ready: HashMap<N::MachineKey, i64> = HashMap::new();
        let mut scheduled = 0usize;
        let enforce_finish = self.validator.enforces_finish_relations();

        for index in order {
            let key = keys[index];
            let Some(slot) = net.slot(key) else {
                continue;
            };
            let machine = match slot.machine {
                Some(m) if net.has_machine(m) => m,
                _ => {
                    warn!(task = %key, "task has no registered machine; left unscheduled");
                    continue;
                }
            };

            let ready = machine_ready.get(&machine).copied().unwrap_or(0);
            let predecessor_ready = earliest_precedence_start(net, key, enforce_finish);
            let earliest = ready.max(predecessor_ready).max(slot.release_ms);

            let start = match net.availability(machine) {
                Some(availability)
                    if self.respect_machine_calendars && !availability.is_unrestricted() =>
                {
                    availability.earliest_fit(earliest, slot.duration_ms)
                }
                _ => Some(earliest),
            };
            let Some(start) = start else {
                warn!(
                    task = %key,
                    from = earliest,
                    duration = slot.duration_ms,
                    "task does not fit the machine calendar; left unscheduled"
                );
                continue;
            };

            net.set_start(key, start);
            net.sync_row(key);
            machine_ready.insert(machine, start + slot.duration_ms);
            scheduled += 1;

            debug!(
                task = %key,
                machine = ?machine,
                start,
                machine_ready = ready,
                predecessor_ready,
                "task placed"
            );
        }

        let mut outcome = self.validator.validate(net);
        outcome.tasks_scheduled = scheduled;
        outcome.message = format!(
            "{}: scheduled {} of {} tasks, makespan {}; {}",
            self.rule.name(),
            scheduled,
            keys.len(),
            format_clock(outcome.makespan_ms),
            if outcome.violations.is_empty() {
                String::from("all precedences satisfied")
            } else {
                format!("{} precedence violation(s) remain", outcome.violations_found)
            }
        );

        info!(
            rule = self.rule.name(),
            scheduled,
            total = keys.len(),
            makespan = outcome.makespan_ms,
            violations = outcome.violations_found,
            "dispatch finished"
        );
        outcome
    }
}

impl Default for DispatchScheduler {
    fn default() -> Self {
        Self::new(DispatchRule::default())
    }
}

/// Schedules a diagram with the given rule.
pub fn schedule_nodes(nodes: &mut [Node], edges: &mut [Edge], rule: DispatchRule) -> Outcome<NodeId> {
    let mut graph = NodeGraph::new(nodes, edges);
    DispatchScheduler::new(rule).schedule(&mut graph)
}

/// Schedules a diagram shortest-processing-time first.
pub fn schedule_nodes_spt(nodes: &mut [Node], edges: &mut [Edge]) -> Outcome<NodeId> {
    schedule_nodes(nodes, edges, DispatchRule::Spt)
}
