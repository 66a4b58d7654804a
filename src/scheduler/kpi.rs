//! Schedule quality metrics (KPIs).
//!
//! Computes standard scheduling performance indicators from the current
//! state of a schedule. Nothing is cached; every call re-derives.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest task end |
//! | Total Processing | Sum of task durations |
//! | Avg Flow Time | Mean (completion - release) over jobs with tasks |
//! | Utilization | Total processing / (machines × makespan) × 100 |
//! | Late Jobs | Jobs with tardiness > 0 |
//! | Total / Max Tardiness | Sum / largest of max(0, completion - due) |
//! | Weighted Tardiness | Sum of weight × tardiness |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::HashMap;

use crate::models::{MachineId, Schedule};
use crate::validation::PrecedenceValidator;

/// Schedule performance indicators.
///
/// All time values are in milliseconds; utilization values are percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleMetrics {
    pub task_count: usize,
    pub machine_count: usize,
    pub job_count: usize,
    /// Makespan: latest task end (ms).
    pub makespan_ms: i64,
    /// Sum of task durations (ms).
    pub total_processing_ms: i64,
    /// Mean job flow time over jobs with a completion time (ms).
    pub avg_flow_time_ms: f64,
    /// Overall machine utilization (0..100).
    pub utilization_pct: f64,
    /// Per-machine utilization (0..100), relative to the makespan.
    pub utilization_by_machine: HashMap<MachineId, f64>,
    /// Precedence violations in the current state.
    pub violation_count: usize,
    /// Jobs finishing after their due time.
    pub late_job_count: usize,
    /// Sum of job tardiness (ms).
    pub total_tardiness_ms: i64,
    /// Largest job tardiness (ms).
    pub max_tardiness_ms: i64,
    /// Sum of weight × tardiness over jobs.
    pub weighted_tardiness: f64,
}

impl ScheduleMetrics {
    /// Computes metrics with the default validator.
    pub fn calculate(schedule: &Schedule) -> Self {
        Self::calculate_with(schedule, &PrecedenceValidator::new())
    }

    /// Computes metrics, counting violations with `validator`.
    ///
    /// Reads only; violation flags on the schedule are left untouched.
    pub fn calculate_with(schedule: &Schedule, validator: &PrecedenceValidator) -> Self {
        let makespan = schedule.makespan_ms();
        let total_processing: i64 = schedule.tasks().iter().map(|t| t.duration_ms()).sum();
        let machine_count = schedule.machines().len();

        let mut total_flow_time: i64 = 0;
        let mut flow_jobs: usize = 0;
        let mut late_jobs: usize = 0;
        let mut total_tardiness: i64 = 0;
        let mut max_tardiness: i64 = 0;
        let mut weighted_tardiness: f64 = 0.0;

        for job in schedule.jobs() {
            if let Some(flow) = schedule.job_flow_time_ms(job.id()) {
                total_flow_time += flow;
                flow_jobs += 1;
            }
            if let Some(tardiness) = schedule.job_tardiness_ms(job.id()) {
                if tardiness > 0 {
                    late_jobs += 1;
                    total_tardiness += tardiness;
                    max_tardiness = max_tardiness.max(tardiness);
                    weighted_tardiness += job.weight * tardiness as f64;
                }
            }
        }

        let utilization_pct = if makespan > 0 && machine_count > 0 {
            total_processing as f64 / (machine_count as f64 * makespan as f64) * 100.0
        } else {
            0.0
        };

        let utilization_by_machine: HashMap<MachineId, f64> = schedule
            .machines()
            .iter()
            .map(|m| {
                let busy: i64 = schedule
                    .tasks_on_machine(m.id())
                    .iter()
                    .map(|t| t.duration_ms())
                    .sum();
                let pct = if makespan > 0 {
                    busy as f64 / makespan as f64 * 100.0
                } else {
                    0.0
                };
                (m.id(), pct)
            })
            .collect();

        let avg_flow_time_ms = if flow_jobs == 0 {
            0.0
        } else {
            total_flow_time as f64 / flow_jobs as f64
        };

        Self {
            task_count: schedule.tasks().len(),
            machine_count,
            job_count: schedule.jobs().len(),
            makespan_ms: makespan,
            total_processing_ms: total_processing,
            avg_flow_time_ms,
            utilization_pct,
            utilization_by_machine,
            violation_count: validator.inspect(schedule).len(),
            late_job_count: late_jobs,
            total_tardiness_ms: total_tardiness,
            max_tardiness_ms: max_tardiness,
            weighted_tardiness,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_tardiness_ms: i64, min_utilization_pct: f64) -> bool {
        self.max_tardiness_ms <= max_tardiness_ms && self.utilization_pct >= min_utilization_pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewJob, NewTask};
    use crate::time::minutes;

    #[test]
    fn test_utilization_sixty_percent() {
        let mut s = Schedule::new();
        let m = s.add_machine("M1");
        let j = s.add_job(NewJob::new("J1"));
        s.add_task(NewTask::new("a", j, minutes(30)).on_machine(m))
            .unwrap();
        s.add_task(
            NewTask::new("b", j, minutes(30))
                .on_machine(m)
                .starting_at(minutes(70)),
        )
        .unwrap();

        let metrics = ScheduleMetrics::calculate(&s);
        assert_eq!(metrics.makespan_ms, minutes(100));
        assert_eq!(metrics.total_processing_ms, minutes(60));
        assert!((metrics.utilization_pct - 60.0).abs() < 1e-10);
        assert!((metrics.utilization_by_machine[&m] - 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_per_machine_utilization() {
        let mut s = Schedule::new();
        let m1 = s.add_machine("M1");
        let m2 = s.add_machine("M2");
        let j = s.add_job(NewJob::new("J1"));
        s.add_task(NewTask::new("a", j, 2000).on_machine(m1)).unwrap();
        s.add_task(NewTask::new("b", j, 1000).on_machine(m2)).unwrap();

        let metrics = ScheduleMetrics::calculate(&s);
        // M1: 2000/2000, M2: 1000/2000
        assert!((metrics.utilization_by_machine[&m1] - 100.0).abs() < 1e-10);
        assert!((metrics.utilization_by_machine[&m2] - 50.0).abs() < 1e-10);
        assert!((metrics.utilization_pct - 75.0).abs() < 1e-10);
    }

    #[test]
    fn test_flow_time_and_tardiness() {
        let mut s = Schedule::new();
        let m = s.add_machine("M1");
        // Released at 1000, completes at 3000 → flow 2000, due 2500 → tardy 500.
        let j1 = s.add_job(NewJob::new("J1").with_release(1000).with_due(2500).with_weight(2.0));
        // Released at 0, completes at 1000 → flow 1000, on time.
        let j2 = s.add_job(NewJob::new("J2").with_due(5000));
        // No tasks: excluded from flow time.
        s.add_job(NewJob::new("empty"));
        s.add_task(NewTask::new("a", j1, 2000).on_machine(m).starting_at(1000))
            .unwrap();
        s.add_task(NewTask::new("b", j2, 1000).on_machine(m)).unwrap();

        let metrics = ScheduleMetrics::calculate(&s);
        assert_eq!(metrics.job_count, 3);
        assert!((metrics.avg_flow_time_ms - 1500.0).abs() < 1e-10);
        assert_eq!(metrics.late_job_count, 1);
        assert_eq!(metrics.total_tardiness_ms, 500);
        assert_eq!(metrics.max_tardiness_ms, 500);
        assert!((metrics.weighted_tardiness - 1000.0).abs() < 1e-10);
    }

    #[test]
    fn test_violations_counted_without_flagging() {
        let mut s = Schedule::new();
        let m = s.add_machine("M1");
        let j = s.add_job(NewJob::new("J1"));
        let a = s.add_task(NewTask::new("a", j, 100).on_machine(m)).unwrap();
        let b = s.add_task(NewTask::new("b", j, 100).on_machine(m)).unwrap();
        s.add_finish_to_start(a, b, 0).unwrap();

        let metrics = ScheduleMetrics::calculate(&s);
        assert_eq!(metrics.violation_count, 1);
        assert_eq!(s.violation_count(), 0);
    }

    #[test]
    fn test_empty() {
        let metrics = ScheduleMetrics::calculate(&Schedule::new());
        assert_eq!(metrics.task_count, 0);
        assert_eq!(metrics.makespan_ms, 0);
        assert_eq!(metrics.utilization_pct, 0.0);
        assert_eq!(metrics.avg_flow_time_ms, 0.0);
        assert!(metrics.utilization_by_machine.is_empty());
    }

    #[test]
    fn test_machines_without_tasks() {
        let mut s = Schedule::new();
        s.add_machine("idle");
        let metrics = ScheduleMetrics::calculate(&s);
        assert_eq!(metrics.machine_count, 1);
        assert_eq!(metrics.utilization_pct, 0.0);
    }

    #[test]
    fn test_meets_thresholds() {
        let mut s = Schedule::new();
        let m = s.add_machine("M1");
        let j = s.add_job(NewJob::new("J1").with_due(500));
        s.add_task(NewTask::new("a", j, 1000).on_machine(m)).unwrap();

        let metrics = ScheduleMetrics::calculate(&s);
        assert!(metrics.meets_thresholds(500, 0.0));
        assert!(!metrics.meets_thresholds(499, 0.0));
        assert!(!metrics.meets_thresholds(1000, 150.0));
    }
}
