//! Conflict-aware left shift of single tasks.
//!
//! # Algorithm
//!
//! For one task:
//! 1. Lower bound = max(latest predecessor end + lag, release).
//! 2. Occupied intervals = other tasks on the same machine that start
//!    before this task's current start, plus machine downtime beginning
//!    before it. Sorted by start.
//! 3. Scan the intervals once from the lower bound; whenever
//!    `[candidate, candidate + duration)` overlaps one, move the candidate
//!    to its end.
//! 4. With working windows defined, snap the candidate into a window and
//!    rescan if it moved.
//!
//! Only earlier starts are reported. Tasks at or after the current start are
//! never displaced, so the other tasks are assumed not to overlap each other.
//!
//! Applying the result and compressing again yields no further move.

use tracing::debug;

use crate::models::TimeWindow;
use crate::network::{earliest_precedence_start, TaskNetwork};

/// Computes and applies earliest feasible starts.
#[derive(Debug, Clone, Copy)]
pub struct Compactor {
    enforce_finish_relations: bool,
    respect_machine_calendars: bool,
}

impl Compactor {
    /// Compactor with informational finish-bound relations and calendars on.
    pub fn new() -> Self {
        Self {
            enforce_finish_relations: false,
            respect_machine_calendars: true,
        }
    }

    /// Enables or disables enforcement of finish-to-finish / start-to-finish.
    pub fn with_finish_relations(mut self, enforced: bool) -> Self {
        self.enforce_finish_relations = enforced;
        self
    }

    /// Enables or disables machine calendar handling.
    pub fn with_machine_calendars(mut self, respected: bool) -> Self {
        self.respect_machine_calendars = respected;
        self
    }

    /// Earliest feasible start for `task`, if strictly earlier than its
    /// current start. `None` means no improvement (or unknown task).
    pub fn compress<N: TaskNetwork>(&self, net: &N, task: N::TaskKey) -> Option<i64> {
        let slot = net.slot(task)?;
        let current = slot.start_ms;
        let duration = slot.duration_ms;

        let mut candidate =
            earliest_precedence_start(net, task, self.enforce_finish_relations).max(slot.release_ms);
        if candidate >= current {
            return None;
        }

        let mut occupied: Vec<TimeWindow> = Vec::new();
        let mut calendar = None;
        if let Some(machine) = slot.machine {
            occupied.extend(
                net.task_keys()
                    .into_iter()
                    .filter(|&k| k != task)
                    .filter_map(|k| net.slot(k))
                    .filter(|o| o.machine == Some(machine) && o.start_ms < current)
                    .map(|o| TimeWindow::new(o.start_ms, o.end_ms())),
            );
            let availability = net
                .availability(machine)
                .filter(|a| self.respect_machine_calendars && !a.is_unrestricted());
            if let Some(availability) = availability {
                occupied.extend(availability.downtime_before(current));
                if !availability.working_windows.is_empty() {
                    calendar = Some(availability);
                }
            }
        }
        occupied.sort_by_key(|w| w.start_ms);

        loop {
            for window in &occupied {
                if window.overlaps_span(candidate, duration) {
                    candidate = candidate.max(window.end_ms);
                }
            }
            let fitted = match calendar {
                Some(availability) => availability.earliest_fit(candidate, duration)?,
                None => candidate,
            };
            if fitted == candidate {
                break;
            }
            candidate = fitted;
        }

        (candidate < current).then_some(candidate)
    }

    /// Moves `task` to its compressed start. Returns the new start if it moved.
    pub fn compact_task<N: TaskNetwork>(&self, net: &mut N, task: N::TaskKey) -> Option<i64> {
        let start = self.compress(net, task)?;
        debug!(task = %task, start, "task compacted");
        net.set_start(task, start);
        Some(start)
    }

    /// Compacts every task, earliest start first. Returns how many moved.
    pub fn compact_all<N: TaskNetwork>(&self, net: &mut N) -> usize {
        let mut keys: Vec<(i64, N::TaskKey)> = net
            .task_keys()
            .into_iter()
            .filter_map(|k| net.slot(k).map(|s| (s.start_ms, k)))
            .collect();
        keys.sort_by_key(|&(start, _)| start);

        keys.into_iter()
            .filter(|&(_, k)| self.compact_task(net, k).is_some())
            .count()
    }
}

impl Default for Compactor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, MachineId, NewJob, NewTask, Relation, Schedule, TaskId};
    use crate::validation::PrecedenceValidator;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn machine_with(tasks: &[(i64, i64)]) -> (Schedule, MachineId, Vec<TaskId>) {
        let mut s = Schedule::new();
        let m = s.add_machine("M1");
        let j = s.add_job(NewJob::new("J1"));
        let ids = tasks
            .iter()
            .enumerate()
            .map(|(i, &(start, dur))| {
                s.add_task(
                    NewTask::new(format!("t{i}"), j, dur)
                        .on_machine(m)
                        .starting_at(start),
                )
                .unwrap()
            })
            .collect();
        (s, m, ids)
    }

    #[test]
    fn test_slides_into_gap() {
        // [0,100) busy, gap [100,300), task at 500.
        let (s, _, ids) = machine_with(&[(0, 100), (300, 100), (500, 150)]);
        assert_eq!(Compactor::new().compress(&s, ids[2]), Some(100));
    }

    #[test]
    fn test_skips_gap_too_small() {
        let (s, _, ids) = machine_with(&[(0, 100), (150, 100), (400, 80)]);
        // Gap [100,150) is 50 ms; 80 ms task lands at 250.
        assert_eq!(Compactor::new().compress(&s, ids[2]), Some(250));
    }

    #[test]
    fn test_no_improvement() {
        let (s, _, ids) = machine_with(&[(0, 100), (100, 100)]);
        let c = Compactor::new();
        assert_eq!(c.compress(&s, ids[0]), None);
        assert_eq!(c.compress(&s, ids[1]), None);
    }

    #[test]
    fn test_ignores_later_tasks() {
        // t1 starts after t0, so it never blocks t0.
        let (s, _, ids) = machine_with(&[(200, 100), (500, 100)]);
        assert_eq!(Compactor::new().compress(&s, ids[0]), Some(0));
    }

    #[test]
    fn test_precedence_lower_bound() {
        let mut s = Schedule::new();
        let m1 = s.add_machine("M1");
        let m2 = s.add_machine("M2");
        let j = s.add_job(NewJob::new("J1"));
        let a = s.add_task(NewTask::new("a", j, 300).on_machine(m1)).unwrap();
        let b = s
            .add_task(NewTask::new("b", j, 50).on_machine(m2).starting_at(900))
            .unwrap();
        s.add_finish_to_start(a, b, 20).unwrap();

        assert_eq!(Compactor::new().compress(&s, b), Some(320));
    }

    /// `a` (100 ms on M1) precedes `b` (10 ms on M2, parked at 500).
    fn related_pair(relation: Relation) -> (Schedule, TaskId) {
        let mut s = Schedule::new();
        let m1 = s.add_machine("M1");
        let m2 = s.add_machine("M2");
        let j = s.add_job(NewJob::new("J1"));
        let a = s.add_task(NewTask::new("a", j, 100).on_machine(m1)).unwrap();
        let b = s
            .add_task(NewTask::new("b", j, 10).on_machine(m2).starting_at(500))
            .unwrap();
        s.add_precedence(a, b, relation, 0).unwrap();
        (s, b)
    }

    #[test]
    fn test_every_relation_bounded_by_predecessor_end() {
        for relation in [
            Relation::StartToStart,
            Relation::FinishToFinish,
            Relation::StartToFinish,
        ] {
            let (s, b) = related_pair(relation);
            assert_eq!(Compactor::new().compress(&s, b), Some(100), "{relation:?}");
        }
    }

    #[test]
    fn test_enforced_relations_use_their_own_bound() {
        let c = Compactor::new().with_finish_relations(true);
        let expected = [
            (Relation::StartToStart, 0),
            (Relation::FinishToFinish, 90),
            (Relation::StartToFinish, 0),
        ];
        for (relation, start) in expected {
            let (s, b) = related_pair(relation);
            assert_eq!(c.compress(&s, b), Some(start), "{relation:?}");
        }
    }

    #[test]
    fn test_release_lower_bound() {
        let mut s = Schedule::new();
        let m = s.add_machine("M1");
        let j = s.add_job(NewJob::new("J1").with_release(250));
        let t = s
            .add_task(NewTask::new("t", j, 10).on_machine(m).starting_at(900))
            .unwrap();
        assert_eq!(Compactor::new().compress(&s, t), Some(250));
    }

    #[test]
    fn test_downtime_is_occupied() {
        let (mut s, m, ids) = machine_with(&[(600, 100)]);
        s.machine_mut(m).unwrap().availability = Availability::always().with_downtime(0, 200);
        let c = Compactor::new();
        assert_eq!(c.compress(&s, ids[0]), Some(200));
        assert_eq!(c.with_machine_calendars(false).compress(&s, ids[0]), Some(0));
    }

    #[test]
    fn test_working_windows_snap() {
        let (mut s, m, ids) = machine_with(&[(900, 100)]);
        s.machine_mut(m).unwrap().availability = Availability::always()
            .with_working_window(0, 50)
            .with_working_window(400, 2000);
        assert_eq!(Compactor::new().compress(&s, ids[0]), Some(400));
    }

    #[test]
    fn test_unassigned_task_uses_precedence_only() {
        let mut s = Schedule::new();
        let j = s.add_job(NewJob::new("J1"));
        let t = s
            .add_task(NewTask::new("t", j, 10).starting_at(70))
            .unwrap();
        assert_eq!(Compactor::new().compress(&s, t), Some(0));
    }

    #[test]
    fn test_fixed_point() {
        let (mut s, _, ids) = machine_with(&[(0, 100), (150, 100), (400, 80)]);
        let c = Compactor::new();
        assert_eq!(c.compact_task(&mut s, ids[2]), Some(250));
        assert_eq!(c.compress(&s, ids[2]), None);
    }

    #[test]
    fn test_compact_all_packs_machine() {
        let (mut s, _, ids) = machine_with(&[(50, 100), (400, 100), (900, 100)]);
        let moved = Compactor::new().compact_all(&mut s);
        assert_eq!(moved, 3);
        let starts: Vec<i64> = ids.iter().map(|&id| s.task(id).unwrap().start_ms()).collect();
        assert_eq!(starts, vec![0, 100, 200]);
    }

    #[test]
    fn test_randomized_compaction_properties() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let mut s = Schedule::new();
            let machines: Vec<MachineId> =
                (0..3).map(|i| s.add_machine(format!("M{i}"))).collect();
            let j = s.add_job(NewJob::new("J"));

            // Non-overlapping placement with random gaps per machine.
            let mut cursor = vec![0i64; machines.len()];
            let mut ids = Vec::new();
            for i in 0..12 {
                let mi = rng.random_range(0..machines.len());
                let dur = rng.random_range(1..200);
                let start = cursor[mi] + rng.random_range(0..300);
                cursor[mi] = start + dur;
                let id = s
                    .add_task(
                        NewTask::new(format!("t{i}"), j, dur)
                            .on_machine(machines[mi])
                            .starting_at(start),
                    )
                    .unwrap();
                ids.push(id);
            }
            // Satisfied forward links only.
            for w in ids.windows(2) {
                let (a, b) = (s.task(w[0]).unwrap(), s.task(w[1]).unwrap());
                if a.end_ms() <= b.start_ms() && rng.random_bool(0.3) {
                    s.add_finish_to_start(w[0], w[1], 0).unwrap();
                }
            }
            assert!(PrecedenceValidator::new().inspect(&s).is_empty());

            let c = Compactor::new();
            for &id in &ids {
                let before = s.task(id).unwrap().start_ms();
                if let Some(start) = c.compress(&s, id) {
                    assert!(start < before);
                }
            }

            c.compact_all(&mut s);
            for &id in &ids {
                assert_eq!(c.compress(&s, id), None);
            }
            assert!(PrecedenceValidator::new().inspect(&s).is_empty());
            for &m in &machines {
                let on_m = s.tasks_on_machine(m);
                for pair in on_m.windows(2) {
                    assert!(pair[0].end_ms() <= pair[1].start_ms());
                }
            }
        }
    }
}
