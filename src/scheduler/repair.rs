//! Greedy precedence repair.
//!
//! # Algorithm
//!
//! Repeat up to `max_iterations` times: validate; stop when clean; otherwise
//! move the successor of the *first* violation forward by its required shift.
//! Violations are reported in constraint order, so a run is reproducible.
//!
//! The loop is myopic: one violation per pass, no reordering, no
//! backtracking. A circular precedence graph never converges and is only
//! noticed by running out of iterations, unless the optional cycle
//! pre-check is enabled.

use tracing::{debug, info, warn};

use crate::config::DEFAULT_MAX_REPAIR_ITERATIONS;
use crate::models::{Edge, Node, NodeId};
use crate::network::{NodeGraph, Outcome, TaskNetwork};
use crate::validation::{find_cycle, PrecedenceValidator};

/// Bounded forward-shift repair loop.
#[derive(Debug, Clone)]
pub struct RepairEngine {
    max_iterations: usize,
    detect_cycles_first: bool,
    validator: PrecedenceValidator,
}

impl RepairEngine {
    /// Creates a repair engine with the default iteration cap.
    pub fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_REPAIR_ITERATIONS,
            detect_cycles_first: false,
            validator: PrecedenceValidator::new(),
        }
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Runs a cycle check before the first shift.
    pub fn with_cycle_check(mut self, enabled: bool) -> Self {
        self.detect_cycles_first = enabled;
        self
    }

    /// Sets the validator (and with it the relation semantics).
    pub fn with_validator(mut self, validator: PrecedenceValidator) -> Self {
        self.validator = validator;
        self
    }

    /// The iteration cap.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Shifts successors forward until no violation remains or the
    /// iteration cap is reached.
    pub fn run<N: TaskNetwork>(&self, net: &mut N) -> Outcome<N::TaskKey> {
        if self.detect_cycles_first {
            if let Some(cycle) = find_cycle(net) {
                let members: Vec<String> = cycle.iter().map(|&k| net.task_name(k)).collect();
                warn!(cycle = ?cycle, "precedence cycle found; repair not attempted");

                let mut outcome = self.validator.validate(net);
                outcome.success = false;
                outcome.message = format!(
                    "Circular dependency detected: {}",
                    members.join(" -> ")
                );
                return outcome;
            }
        }

        let mut iterations = 0usize;
        let exhausted = loop {
            let violations = self.validator.inspect(net);
            let Some(first) = violations.first() else {
                break false;
            };
            if iterations >= self.max_iterations {
                break true;
            }

            let current = net.slot(first.successor).map_or(0, |s| s.start_ms);
            net.set_start(first.successor, current + first.required_shift_ms);
            iterations += 1;

            debug!(
                iteration = iterations,
                task = %first.successor,
                relation = first.relation.code(),
                shift = first.required_shift_ms,
                remaining = violations.len(),
                "shifted successor"
            );
        };

        let mut outcome = self.validator.validate(net);
        outcome.iterations = iterations;

        if exhausted {
            outcome.success = false;
            outcome.message = format!(
                "Could not resolve all violations after {iterations} iterations; \
                 {} remain. Possible circular dependency.",
                outcome.violations_found
            );
            warn!(
                iterations,
                remaining = outcome.violations_found,
                "repair gave up at iteration cap"
            );
        } else {
            outcome.message = format!("All violations resolved in {iterations} iteration(s)");
            info!(iterations, makespan = outcome.makespan_ms, "repair finished");
        }
        outcome
    }
}

impl Default for RepairEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Repairs a diagram, treating each task-to-task edge as zero-lag
/// finish-to-start.
pub fn auto_fix_node_violations(nodes: &mut [Node], edges: &mut [Edge]) -> Outcome<NodeId> {
    let mut graph = NodeGraph::new(nodes, edges);
    RepairEngine::new().run(&mut graph)
}
