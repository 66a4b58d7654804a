//! Schedule aggregate.
//!
//! The schedule owns every machine, job, task and precedence constraint and
//! is the only place cross-references are changed. Adding a task wires it
//! into its job and machine; removals cascade so that no task points at a
//! missing job or machine (other than "unassigned") and no precedence points
//! at a missing task.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{
    IdSequence, Job, JobId, Machine, MachineId, NewJob, NewTask, Precedence, PrecedenceId,
    Relation, Task, TaskId, TimeWindow,
};
use crate::error::{Result, ScheduleError};

/// Default visible timeline: one day.
const DEFAULT_TIMELINE_END_MS: i64 = 24 * 60 * 60 * 1000;

/// A schedule: machines, jobs, tasks and precedences on a shared timeline.
///
/// All collections keep insertion order, which is the order FIFO dispatching
/// and violation reporting follow.
///
/// Deserialization goes through [`Schedule::check_integrity`], so a
/// document with dangling references is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ScheduleData")]
pub struct Schedule {
    machines: Vec<Machine>,
    jobs: Vec<Job>,
    tasks: Vec<Task>,
    precedences: Vec<Precedence>,
    timeline: TimeWindow,
    machine_ids: IdSequence,
    job_ids: IdSequence,
    task_ids: IdSequence,
    precedence_ids: IdSequence,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            machines: Vec::new(),
            jobs: Vec::new(),
            tasks: Vec::new(),
            precedences: Vec::new(),
            timeline: TimeWindow::new(0, DEFAULT_TIMELINE_END_MS),
            machine_ids: IdSequence::new(),
            job_ids: IdSequence::new(),
            task_ids: IdSequence::new(),
            precedence_ids: IdSequence::new(),
        }
    }
}

/// Serialized form of a [`Schedule`], checked before it is accepted.
#[derive(Deserialize)]
struct ScheduleData {
    machines: Vec<Machine>,
    jobs: Vec<Job>,
    tasks: Vec<Task>,
    precedences: Vec<Precedence>,
    timeline: TimeWindow,
    machine_ids: IdSequence,
    job_ids: IdSequence,
    task_ids: IdSequence,
    precedence_ids: IdSequence,
}

impl TryFrom<ScheduleData> for Schedule {
    type Error = ScheduleError;

    fn try_from(data: ScheduleData) -> Result<Self> {
        let mut schedule = Self {
            machines: data.machines,
            jobs: data.jobs,
            tasks: data.tasks,
            precedences: data.precedences,
            timeline: data.timeline,
            machine_ids: data.machine_ids,
            job_ids: data.job_ids,
            task_ids: data.task_ids,
            precedence_ids: data.precedence_ids,
        };
        schedule.check_integrity()?;

        // Counters must never hand out an id already in use.
        for m in &schedule.machines {
            schedule.machine_ids.reserve_through(m.id().get());
        }
        for j in &schedule.jobs {
            schedule.job_ids.reserve_through(j.id().get());
        }
        for t in &schedule.tasks {
            schedule.task_ids.reserve_through(t.id().get());
        }
        for p in &schedule.precedences {
            schedule.precedence_ids.reserve_through(p.id().get());
        }
        Ok(schedule)
    }
}

impl Schedule {
    /// Creates an empty schedule with a one-day timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the visible timeline window.
    pub fn with_timeline(mut self, start_ms: i64, end_ms: i64) -> Self {
        self.timeline = TimeWindow::new(start_ms, end_ms);
        self
    }

    // ======================== Machines ========================

    /// Adds a machine in the next free row.
    pub fn add_machine(&mut self, name: impl Into<String>) -> MachineId {
        let id = MachineId(self.machine_ids.allocate());
        let row = self.machines.len();
        self.machines.push(Machine::new(id, name, row));
        id
    }

    /// Looks up a machine.
    pub fn machine(&self, id: MachineId) -> Option<&Machine> {
        self.machines.iter().find(|m| m.id() == id)
    }

    /// Looks up a machine for editing its name or availability.
    pub fn machine_mut(&mut self, id: MachineId) -> Option<&mut Machine> {
        self.machines.iter_mut().find(|m| m.id() == id)
    }

    /// All machines, in insertion order.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Removes a machine.
    ///
    /// Its tasks are unassigned, not deleted. Remaining machines are
    /// renumbered so rows stay contiguous in their previous relative order.
    pub fn remove_machine(&mut self, id: MachineId) -> Result<Machine> {
        let index = self
            .machines
            .iter()
            .position(|m| m.id() == id)
            .ok_or(ScheduleError::UnknownMachine(id))?;
        let removed = self.machines.remove(index);

        for task in self.tasks.iter_mut().filter(|t| t.machine_id() == Some(id)) {
            task.set_machine(None, 0);
        }

        let mut order: Vec<usize> = (0..self.machines.len()).collect();
        order.sort_by_key(|&i| self.machines[i].row());
        for (row, &i) in order.iter().enumerate() {
            self.machines[i].set_row(row);
        }
        self.sync_task_rows();

        Ok(removed)
    }

    // ======================== Jobs ========================

    /// Adds a job.
    pub fn add_job(&mut self, draft: NewJob) -> JobId {
        let id = JobId(self.job_ids.allocate());
        self.jobs.push(Job::from_draft(id, draft));
        id
    }

    /// Looks up a job.
    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id() == id)
    }

    /// Looks up a job for editing its attributes.
    pub fn job_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|j| j.id() == id)
    }

    /// All jobs, in insertion order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Removes a job together with its tasks and their precedences.
    pub fn remove_job(&mut self, id: JobId) -> Result<Job> {
        let task_ids: Vec<TaskId> = self
            .job(id)
            .ok_or(ScheduleError::UnknownJob(id))?
            .task_ids()
            .to_vec();
        for task_id in task_ids {
            self.remove_task(task_id)?;
        }
        let index = self
            .jobs
            .iter()
            .position(|j| j.id() == id)
            .ok_or(ScheduleError::UnknownJob(id))?;
        Ok(self.jobs.remove(index))
    }

    // ======================== Tasks ========================

    /// Adds a task, wiring it into its job and (optional) machine.
    pub fn add_task(&mut self, draft: NewTask) -> Result<TaskId> {
        if draft.duration_ms < 0 {
            return Err(ScheduleError::NegativeDuration(draft.duration_ms));
        }
        if self.job(draft.job_id).is_none() {
            return Err(ScheduleError::UnknownJob(draft.job_id));
        }
        let row = match draft.machine_id {
            Some(machine_id) => self
                .machine(machine_id)
                .ok_or(ScheduleError::UnknownMachine(machine_id))?
                .row(),
            None => 0,
        };

        let id = TaskId(self.task_ids.allocate());
        let task = Task::from_draft(id, draft, row);

        if let Some(job) = self.job_mut(task.job_id()) {
            job.attach(id);
        }
        if let Some(machine) = task.machine_id().and_then(|m| self.machine_mut(m)) {
            machine.attach(id);
        }
        self.tasks.push(task);
        Ok(id)
    }

    /// Looks up a task.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Looks up a task for editing timing or display fields.
    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id() == id)
    }

    /// All tasks, in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Mutable iteration over all tasks.
    pub fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.tasks.iter_mut()
    }

    /// Removes a task and every precedence that references it.
    pub fn remove_task(&mut self, id: TaskId) -> Result<Task> {
        let index = self
            .task_index(id)
            .ok_or(ScheduleError::UnknownTask(id))?;
        let task = self.tasks.remove(index);

        if let Some(job) = self.job_mut(task.job_id()) {
            job.detach(id);
        }
        if let Some(machine) = task.machine_id().and_then(|m| self.machine_mut(m)) {
            machine.detach(id);
        }
        self.precedences.retain(|p| !p.involves(id));
        Ok(task)
    }

    /// Moves a task to another machine, or unassigns it with `None`.
    pub fn assign_machine(&mut self, task_id: TaskId, machine_id: Option<MachineId>) -> Result<()> {
        let previous = self
            .task(task_id)
            .ok_or(ScheduleError::UnknownTask(task_id))?
            .machine_id();
        let row = match machine_id {
            Some(m) => self.machine(m).ok_or(ScheduleError::UnknownMachine(m))?.row(),
            None => 0,
        };

        if let Some(old) = previous.and_then(|m| self.machine_mut(m)) {
            old.detach(task_id);
        }
        if let Some(new) = machine_id.and_then(|m| self.machine_mut(m)) {
            new.attach(task_id);
        }
        if let Some(task) = self.task_mut(task_id) {
            task.set_machine(machine_id, row);
        }
        Ok(())
    }

    // ======================== Precedences ========================

    /// Adds a precedence constraint `predecessor -> successor`.
    pub fn add_precedence(
        &mut self,
        predecessor: TaskId,
        successor: TaskId,
        relation: Relation,
        lag_ms: i64,
    ) -> Result<PrecedenceId> {
        if predecessor == successor {
            return Err(ScheduleError::SelfPrecedence(predecessor));
        }
        for id in [predecessor, successor] {
            if self.task(id).is_none() {
                return Err(ScheduleError::UnknownTask(id));
            }
        }
        let id = PrecedenceId(self.precedence_ids.allocate());
        self.precedences
            .push(Precedence::new(id, predecessor, successor, relation, lag_ms));
        Ok(id)
    }

    /// Shorthand for a finish-to-start constraint.
    pub fn add_finish_to_start(
        &mut self,
        predecessor: TaskId,
        successor: TaskId,
        lag_ms: i64,
    ) -> Result<PrecedenceId> {
        self.add_precedence(predecessor, successor, Relation::FinishToStart, lag_ms)
    }

    /// Looks up a precedence.
    pub fn precedence(&self, id: PrecedenceId) -> Option<&Precedence> {
        self.precedences.iter().find(|p| p.id() == id)
    }

    /// Looks up a precedence for editing relation or lag.
    pub fn precedence_mut(&mut self, id: PrecedenceId) -> Option<&mut Precedence> {
        self.precedences.iter_mut().find(|p| p.id() == id)
    }

    /// All precedences, in insertion order.
    pub fn precedences(&self) -> &[Precedence] {
        &self.precedences
    }

    /// Removes a precedence.
    pub fn remove_precedence(&mut self, id: PrecedenceId) -> Result<Precedence> {
        let index = self
            .precedences
            .iter()
            .position(|p| p.id() == id)
            .ok_or(ScheduleError::UnknownPrecedence(id))?;
        Ok(self.precedences.remove(index))
    }

    /// Constraints in which `task` is the successor.
    pub fn predecessors_of(&self, task: TaskId) -> Vec<&Precedence> {
        self.precedences
            .iter()
            .filter(|p| p.successor() == task)
            .collect()
    }

    // ======================== Queries ========================

    /// Tasks assigned to a machine, ordered by start time.
    pub fn tasks_on_machine(&self, machine: MachineId) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.machine_id() == Some(machine))
            .collect();
        tasks.sort_by_key(|t| t.start_ms());
        tasks
    }

    /// Tasks owned by a job, in insertion order.
    pub fn tasks_of_job(&self, job: JobId) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.job_id() == job).collect()
    }

    /// Makespan: latest task end (ms), 0 without tasks.
    pub fn makespan_ms(&self) -> i64 {
        self.tasks.iter().map(Task::end_ms).max().unwrap_or(0)
    }

    /// Number of tasks flagged by the last validation.
    pub fn violation_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_violating()).count()
    }

    /// Completion time of a job: latest end of its tasks.
    pub fn job_completion_ms(&self, job: JobId) -> Option<i64> {
        self.tasks
            .iter()
            .filter(|t| t.job_id() == job)
            .map(Task::end_ms)
            .max()
    }

    /// Flow time of a job: completion − release.
    pub fn job_flow_time_ms(&self, job: JobId) -> Option<i64> {
        let release = self.job(job)?.release_ms;
        self.job_completion_ms(job).map(|c| c - release)
    }

    /// Tardiness of a job: max(0, completion − due). `None` without a due
    /// date or without tasks.
    pub fn job_tardiness_ms(&self, job: JobId) -> Option<i64> {
        let due = self.job(job)?.due_ms?;
        self.job_completion_ms(job).map(|c| (c - due).max(0))
    }

    /// Visible timeline window.
    pub fn timeline(&self) -> TimeWindow {
        self.timeline
    }

    /// Replaces the visible timeline window.
    pub fn set_timeline(&mut self, timeline: TimeWindow) {
        self.timeline = timeline;
    }

    /// Extends the timeline end so the makespan is visible. Never shrinks.
    pub fn fit_timeline_to_makespan(&mut self) {
        self.timeline.end_ms = self.timeline.end_ms.max(self.makespan_ms());
    }

    // ======================== Integrity ========================

    /// Checks every cross-reference.
    ///
    /// Tasks must name an existing job and, if assigned, an existing
    /// machine, and have a non-negative duration. Precedences must join two
    /// different existing tasks. Machine and job membership lists must name
    /// existing tasks. Returns the first problem found.
    pub fn check_integrity(&self) -> Result<()> {
        let machines: HashSet<MachineId> = self.machines.iter().map(|m| m.id()).collect();
        let jobs: HashSet<JobId> = self.jobs.iter().map(|j| j.id()).collect();
        let tasks: HashSet<TaskId> = self.tasks.iter().map(|t| t.id()).collect();

        for task in &self.tasks {
            if !jobs.contains(&task.job_id()) {
                return Err(ScheduleError::UnknownJob(task.job_id()));
            }
            if let Some(machine) = task.machine_id() {
                if !machines.contains(&machine) {
                    return Err(ScheduleError::UnknownMachine(machine));
                }
            }
            if task.duration_ms() < 0 {
                return Err(ScheduleError::NegativeDuration(task.duration_ms()));
            }
        }

        for p in &self.precedences {
            if p.predecessor() == p.successor() {
                return Err(ScheduleError::SelfPrecedence(p.predecessor()));
            }
            for id in [p.predecessor(), p.successor()] {
                if !tasks.contains(&id) {
                    return Err(ScheduleError::UnknownTask(id));
                }
            }
        }

        let members = self
            .machines
            .iter()
            .flat_map(|m| m.task_ids())
            .chain(self.jobs.iter().flat_map(|j| j.task_ids()));
        for id in members {
            if !tasks.contains(id) {
                return Err(ScheduleError::UnknownTask(*id));
            }
        }
        Ok(())
    }

    // ======================== Crate internals ========================

    pub(crate) fn task_index(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id() == id)
    }

    pub(crate) fn task_at_mut(&mut self, index: usize) -> &mut Task {
        &mut self.tasks[index]
    }

    pub(crate) fn precedence_at_mut(&mut self, index: usize) -> &mut Precedence {
        &mut self.precedences[index]
    }

    /// Mirrors each assigned task's row from its machine.
    pub(crate) fn sync_task_rows(&mut self) {
        let rows: Vec<(MachineId, usize)> =
            self.machines.iter().map(|m| (m.id(), m.row())).collect();
        for task in &mut self.tasks {
            if let Some(machine_id) = task.machine_id() {
                if let Some(&(_, row)) = rows.iter().find(|(id, _)| *id == machine_id) {
                    task.set_row(row);
                }
            }
        }
    }
}
