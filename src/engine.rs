//! Configured entry point for every scheduling operation.
//!
//! [`Engine`] turns one [`EngineConfig`] into consistently configured
//! validators, schedulers, repair loops and compactors, and exposes them for
//! both data shapes: the [`Schedule`] aggregate and node/edge diagrams.
//!
//! # Usage
//!
//! ```
//! use u_gantt::engine::Engine;
//! use u_gantt::models::{NewJob, NewTask, Schedule};
//!
//! let mut schedule = Schedule::new();
//! let saw = schedule.add_machine("Saw");
//! let job = schedule.add_job(NewJob::new("Table"));
//! let cut = schedule.add_task(NewTask::new("Cut", job, 3_000).on_machine(saw)).unwrap();
//! let trim = schedule.add_task(NewTask::new("Trim", job, 1_000).on_machine(saw)).unwrap();
//! schedule.add_finish_to_start(cut, trim, 0).unwrap();
//!
//! let engine = Engine::default();
//! let outcome = engine.schedule_fifo(&mut schedule);
//! assert!(outcome.success);
//! assert_eq!(engine.calculate_metrics(&schedule).makespan_ms, 4_000);
//! ```

use crate::config::EngineConfig;
use crate::dispatching::DispatchRule;
use crate::models::{Edge, Node, NodeId, Schedule, TaskId};
use crate::network::{NodeGraph, Outcome};
use crate::scheduler::{self, Compactor, DispatchScheduler, RepairEngine, ScheduleMetrics};
use crate::validation::{self, PrecedenceValidator};

/// Scheduling engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine from a configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validator honouring the configured relation semantics.
    pub fn validator(&self) -> PrecedenceValidator {
        PrecedenceValidator::new().with_finish_relations(self.config.enforce_finish_relations)
    }

    /// Dispatch scheduler for `rule`.
    pub fn dispatcher(&self, rule: DispatchRule) -> DispatchScheduler {
        DispatchScheduler::new(rule)
            .with_validator(self.validator())
            .with_machine_calendars(self.config.respect_machine_calendars)
    }

    /// Repair loop.
    pub fn repairer(&self) -> RepairEngine {
        RepairEngine::new()
            .with_max_iterations(self.config.max_repair_iterations)
            .with_cycle_check(self.config.detect_cycles_before_repair)
            .with_validator(self.validator())
    }

    /// Compactor.
    pub fn compactor(&self) -> Compactor {
        Compactor::new()
            .with_finish_relations(self.config.enforce_finish_relations)
            .with_machine_calendars(self.config.respect_machine_calendars)
    }

    // ======================== Schedule aggregate ========================

    /// Recomputes violation flags and reports every violated constraint.
    pub fn validate_precedences(&self, schedule: &mut Schedule) -> Outcome<TaskId> {
        self.validator().validate(schedule)
    }

    /// Schedules with the given dispatch rule.
    pub fn schedule_with(&self, schedule: &mut Schedule, rule: DispatchRule) -> Outcome<TaskId> {
        self.dispatcher(rule).schedule(schedule)
    }

    /// Shortest processing time first.
    pub fn schedule_spt(&self, schedule: &mut Schedule) -> Outcome<TaskId> {
        self.schedule_with(schedule, DispatchRule::Spt)
    }

    /// Longest processing time first.
    pub fn schedule_lpt(&self, schedule: &mut Schedule) -> Outcome<TaskId> {
        self.schedule_with(schedule, DispatchRule::Lpt)
    }

    /// Collection order.
    pub fn schedule_fifo(&self, schedule: &mut Schedule) -> Outcome<TaskId> {
        self.schedule_with(schedule, DispatchRule::Fifo)
    }

    /// Greedy forward-shift repair.
    pub fn auto_fix_violations(&self, schedule: &mut Schedule) -> Outcome<TaskId> {
        self.repairer().run(schedule)
    }

    /// Earliest feasible start of `task`, if strictly earlier than now.
    pub fn compress_task(&self, schedule: &Schedule, task: TaskId) -> Option<i64> {
        self.compactor().compress(schedule, task)
    }

    /// Moves `task` to its compressed start, if any.
    pub fn compact_task(&self, schedule: &mut Schedule, task: TaskId) -> Option<i64> {
        self.compactor().compact_task(schedule, task)
    }

    /// Compacts every task; returns how many moved.
    pub fn compact_schedule(&self, schedule: &mut Schedule) -> usize {
        self.compactor().compact_all(schedule)
    }

    /// Computes quality metrics. Does not modify the schedule.
    pub fn calculate_metrics(&self, schedule: &Schedule) -> ScheduleMetrics {
        ScheduleMetrics::calculate_with(schedule, &self.validator())
    }

    /// Recomputes critical flags; returns how many tasks are critical.
    pub fn mark_critical_chain(&self, schedule: &mut Schedule) -> usize {
        scheduler::mark_critical_chain(schedule)
    }

    /// Members of a precedence cycle, if one exists.
    pub fn find_cycle(&self, schedule: &Schedule) -> Option<Vec<TaskId>> {
        validation::find_cycle(schedule)
    }

    // ======================== Node diagrams ========================

    /// Validates a diagram; each task-to-task edge is zero-lag finish-to-start.
    pub fn validate_node_precedences(&self, nodes: &mut [Node], edges: &mut [Edge]) -> Outcome<NodeId> {
        self.validator().validate(&mut NodeGraph::new(nodes, edges))
    }

    /// Schedules a diagram shortest processing time first.
    pub fn schedule_nodes_spt(&self, nodes: &mut [Node], edges: &mut [Edge]) -> Outcome<NodeId> {
        self.schedule_nodes(nodes, edges, DispatchRule::Spt)
    }

    /// Schedules a diagram with the given rule.
    pub fn schedule_nodes(
        &self,
        nodes: &mut [Node],
        edges: &mut [Edge],
        rule: DispatchRule,
    ) -> Outcome<NodeId> {
        self.dispatcher(rule).schedule(&mut NodeGraph::new(nodes, edges))
    }

    /// Repairs a diagram.
    pub fn auto_fix_node_violations(&self, nodes: &mut [Node], edges: &mut [Edge]) -> Outcome<NodeId> {
        self.repairer().run(&mut NodeGraph::new(nodes, edges))
    }
}
