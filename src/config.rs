//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Repair iteration budget used when none is configured.
pub const DEFAULT_MAX_REPAIR_ITERATIONS: usize = 100;

/// Tunables shared by the validator, schedulers and repair loop.
///
/// Missing fields fall back to [`Default`] when deserializing, so a partial
/// document such as `{"max_repair_iterations": 20}` is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on greedy repair passes before giving up.
    pub max_repair_iterations: usize,
    /// Run a structural cycle check before repairing and fail fast on a cycle.
    pub detect_cycles_before_repair: bool,
    /// Enforce finish-to-finish and start-to-finish constraints by shifting
    /// the successor's start. When off they are informational only.
    pub enforce_finish_relations: bool,
    /// Keep placements inside machine working windows and out of downtime.
    pub respect_machine_calendars: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_repair_iterations: DEFAULT_MAX_REPAIR_ITERATIONS,
            detect_cycles_before_repair: false,
            enforce_finish_relations: false,
            respect_machine_calendars: true,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the repair iteration budget.
    pub fn with_max_repair_iterations(mut self, iterations: usize) -> Self {
        self.max_repair_iterations = iterations;
        self
    }

    /// Enables or disables the pre-repair cycle check.
    pub fn with_cycle_check(mut self, enabled: bool) -> Self {
        self.detect_cycles_before_repair = enabled;
        self
    }

    /// Enables or disables enforcement of finish-to-finish / start-to-finish.
    pub fn with_finish_relations(mut self, enforced: bool) -> Self {
        self.enforce_finish_relations = enforced;
        self
    }

    /// Enables or disables machine calendar handling during placement.
    pub fn with_machine_calendars(mut self, respected: bool) -> Self {
        self.respect_machine_calendars = respected;
        self
    }
}
