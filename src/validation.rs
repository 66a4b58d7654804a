//! Precedence validation and cycle detection.
//!
//! The validator recomputes the violation state of every constraint of a
//! [`TaskNetwork`]. A constraint is violated when the successor starts
//! earlier than its relation and lag allow; the successor and the constraint
//! are flagged and a [`Violation`] record carries the required forward shift.
//!
//! # Relation Semantics
//! - Finish-to-start: `succ.start >= pred.end + lag`
//! - Start-to-start: `succ.start >= pred.start + lag`
//! - Finish-to-finish / start-to-finish: informational unless
//!   `enforce_finish_relations` is set, in which case the successor's end
//!   is held to `pred.end + lag` / `pred.start + lag` by its start.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::{Edge, Node, NodeId, Relation};
use crate::network::{Link, NodeGraph, Outcome, TaskNetwork, TaskSlot, Violation};
use crate::time::format_clock;

/// Recomputes precedence violation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrecedenceValidator {
    enforce_finish_relations: bool,
}

impl PrecedenceValidator {
    /// Validator with finish-bound relations treated as informational.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables enforcement of finish-to-finish / start-to-finish.
    pub fn with_finish_relations(mut self, enforced: bool) -> Self {
        self.enforce_finish_relations = enforced;
        self
    }

    /// Whether finish-bound relations are enforced.
    pub fn enforces_finish_relations(&self) -> bool {
        self.enforce_finish_relations
    }

    /// Clears all flags, re-checks every constraint in link order and flags
    /// the violated ones.
    pub fn validate<N: TaskNetwork>(&self, net: &mut N) -> Outcome<N::TaskKey> {
        net.clear_violations();
        let found = self.check(net);
        for (index, violation) in &found {
            net.flag_violation(*index, &violation.message);
        }

        let link_count = net.links().len();
        let violations: Vec<Violation<N::TaskKey>> = found.into_iter().map(|(_, v)| v).collect();
        debug!(
            constraints = link_count,
            violations = violations.len(),
            "precedence validation finished"
        );

        let message = if violations.is_empty() {
            format!("All {link_count} precedence constraints satisfied")
        } else {
            format!("{} precedence violation(s) found", violations.len())
        };

        Outcome {
            success: violations.is_empty(),
            message,
            tasks_scheduled: 0,
            violations_found: violations.len(),
            makespan_ms: net.makespan_ms(),
            iterations: 0,
            violations,
        }
    }

    /// Violations in link order, without touching any flag.
    pub fn inspect<N: TaskNetwork>(&self, net: &N) -> Vec<Violation<N::TaskKey>> {
        self.check(net).into_iter().map(|(_, v)| v).collect()
    }

    fn check<N: TaskNetwork>(&self, net: &N) -> Vec<(usize, Violation<N::TaskKey>)> {
        net.links()
            .into_iter()
            .enumerate()
            .filter_map(|(index, link)| {
                let pred = net.slot(link.predecessor)?;
                let succ = net.slot(link.successor)?;
                let required = link.relation.required_successor_start(
                    pred.start_ms,
                    pred.duration_ms,
                    succ.duration_ms,
                    link.lag_ms,
                    self.enforce_finish_relations,
                )?;
                if succ.start_ms >= required {
                    return None;
                }

                let predecessor_name = net.task_name(link.predecessor);
                let successor_name = net.task_name(link.successor);
                let message = describe(&link, &predecessor_name, &successor_name, &pred, &succ);
                Some((
                    index,
                    Violation {
                        predecessor: link.predecessor,
                        successor: link.successor,
                        predecessor_name,
                        successor_name,
                        relation: link.relation,
                        lag_ms: link.lag_ms,
                        predecessor_end_ms: pred.end_ms(),
                        successor_start_ms: succ.start_ms,
                        required_shift_ms: (required - succ.start_ms).max(0),
                        message,
                    },
                ))
            })
            .collect()
    }
}

fn describe<K, M>(
    link: &Link<K>,
    predecessor: &str,
    successor: &str,
    pred: &TaskSlot<M>,
    succ: &TaskSlot<M>,
) -> String {
    let (pred_point, pred_time) = match link.relation {
        Relation::FinishToStart | Relation::FinishToFinish => ("ends", pred.end_ms()),
        Relation::StartToStart | Relation::StartToFinish => ("starts", pred.start_ms),
    };
    let (succ_point, succ_time) = if link.relation.binds_successor_finish() {
        ("ends", succ.end_ms())
    } else {
        ("starts", succ.start_ms)
    };

    let mut message = format!(
        "'{predecessor}' {pred_point} at {} but '{successor}' {succ_point} at {}",
        format_clock(pred_time),
        format_clock(succ_time)
    );
    if link.lag_ms != 0 {
        message.push_str(&format!(" (lag {})", format_clock(link.lag_ms)));
    }
    message
}

/// Validates a diagram, treating each task-to-task edge as zero-lag
/// finish-to-start.
pub fn validate_node_precedences(nodes: &mut [Node], edges: &mut [Edge]) -> Outcome<NodeId> {
    let mut graph = NodeGraph::new(nodes, edges);
    PrecedenceValidator::new().validate(&mut graph)
}

/// Finds a precedence cycle.
///
/// Returns the tasks on the first cycle found, starting from the task where
/// the back edge lands, in traversal order. Roots are tried in task order
/// and successors in link order, so the result is deterministic.
///
/// # Algorithm
/// Iterative DFS with an explicit frame stack and an on-stack set. A back
/// edge (reaching a node currently on the stack) closes a cycle.
///
/// # Complexity
/// O(V + E), independent of chain depth.
pub fn find_cycle<N: TaskNetwork>(net: &N) -> Option<Vec<N::TaskKey>> {
    let mut adj: HashMap<N::TaskKey, Vec<N::TaskKey>> = HashMap::new();
    for link in net.links() {
        adj.entry(link.predecessor).or_default().push(link.successor);
    }

    let mut visited = HashSet::new();
    let mut on_stack = HashSet::new();

    for root in net.task_keys() {
        if !visited.insert(root) {
            continue;
        }
        on_stack.insert(root);
        // (node, index of the next successor to explore)
        let mut frames: Vec<(N::TaskKey, usize)> = vec![(root, 0)];

        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            let successors = adj.get(&node).map_or(&[][..], Vec::as_slice);
            let Some(&next) = successors.get(frame.1) else {
                on_stack.remove(&node);
                frames.pop();
                continue;
            };
            frame.1 += 1;

            if on_stack.contains(&next) {
                let pos = frames.iter().position(|&(k, _)| k == next).unwrap_or(0);
                return Some(frames[pos..].iter().map(|&(k, _)| k).collect());
            }
            if visited.insert(next) {
                on_stack.insert(next);
                frames.push((next, 0));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobId, MachineId, NewJob, NewTask, Schedule, TaskId};
    use crate::time::minutes;

    /// task1 (30 min at 0) → task2 (45 min at 30) on one machine.
    fn two_task_schedule() -> (Schedule, TaskId, TaskId) {
        let mut s = Schedule::new();
        let m: MachineId = s.add_machine("Mill");
        let j: JobId = s.add_job(NewJob::new("J1"));
        let t1 = s
            .add_task(NewTask::new("task1", j, minutes(30)).on_machine(m))
            .unwrap();
        let t2 = s
            .add_task(
                NewTask::new("task2", j, minutes(45))
                    .on_machine(m)
                    .starting_at(minutes(30)),
            )
            .unwrap();
        s.add_finish_to_start(t1, t2, 0).unwrap();
        (s, t1, t2)
    }

    #[test]
    fn test_satisfied_schedule() {
        let (mut s, _, _) = two_task_schedule();
        let outcome = PrecedenceValidator::new().validate(&mut s);
        assert!(outcome.success);
        assert_eq!(outcome.violations_found, 0);
        assert_eq!(outcome.message, "All 1 precedence constraints satisfied");
        assert_eq!(outcome.makespan_ms, minutes(75));
    }

    #[test]
    fn test_violation_required_shift() {
        let (mut s, t1, t2) = two_task_schedule();
        s.task_mut(t2).unwrap().set_start_ms(minutes(20));

        let outcome = PrecedenceValidator::new().validate(&mut s);
        assert!(!outcome.success);
        assert_eq!(outcome.violations_found, 1);

        let v = &outcome.violations[0];
        assert_eq!(v.predecessor, t1);
        assert_eq!(v.successor, t2);
        assert_eq!(v.predecessor_name, "task1");
        assert_eq!(v.predecessor_end_ms, minutes(30));
        assert_eq!(v.successor_start_ms, minutes(20));
        assert_eq!(v.required_shift_ms, minutes(10));
        assert_eq!(v.message, "'task1' ends at 0:30 but 'task2' starts at 0:20");

        assert!(s.task(t2).unwrap().is_violating());
        assert!(!s.task(t1).unwrap().is_violating());
        assert!(s.precedences()[0].is_violating());
        assert_eq!(s.violation_count(), 1);
    }

    #[test]
    fn test_flags_cleared_on_revalidation() {
        let (mut s, _, t2) = two_task_schedule();
        s.task_mut(t2).unwrap().set_start_ms(0);
        PrecedenceValidator::new().validate(&mut s);
        assert_eq!(s.violation_count(), 1);

        s.task_mut(t2).unwrap().set_start_ms(minutes(30));
        let outcome = PrecedenceValidator::new().validate(&mut s);
        assert!(outcome.success);
        assert_eq!(s.violation_count(), 0);
        assert!(s.precedences()[0].message().is_none());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let (mut s, _, t2) = two_task_schedule();
        s.task_mut(t2).unwrap().set_start_ms(minutes(5));
        let validator = PrecedenceValidator::new();
        let first = validator.validate(&mut s);
        let second = validator.validate(&mut s);
        assert_eq!(first, second);
    }

    #[test]
    fn test_inspect_leaves_flags_alone() {
        let (mut s, _, t2) = two_task_schedule();
        s.task_mut(t2).unwrap().set_start_ms(0);
        let violations = PrecedenceValidator::new().inspect(&s);
        assert_eq!(violations.len(), 1);
        assert_eq!(s.violation_count(), 0);
    }

    #[test]
    fn test_lag_in_message_and_shift() {
        let (mut s, t1, t2) = two_task_schedule();
        let p = s.precedences()[0].id();
        s.precedence_mut(p).unwrap().lag_ms = minutes(15);
        let outcome = PrecedenceValidator::new().validate(&mut s);
        let v = &outcome.violations[0];
        assert_eq!(v.required_shift_ms, minutes(15));
        assert!(v.message.ends_with("(lag 0:15)"));
        assert_eq!((v.predecessor, v.successor), (t1, t2));
    }

    #[test]
    fn test_negative_lag_permits_overlap() {
        let (mut s, _, t2) = two_task_schedule();
        let p = s.precedences()[0].id();
        s.precedence_mut(p).unwrap().lag_ms = -minutes(10);
        s.task_mut(t2).unwrap().set_start_ms(minutes(20));
        assert!(PrecedenceValidator::new().validate(&mut s).success);
    }

    #[test]
    fn test_start_to_start() {
        let mut s = Schedule::new();
        let j = s.add_job(NewJob::new("J"));
        let a = s.add_task(NewTask::new("a", j, 100).starting_at(50)).unwrap();
        let b = s.add_task(NewTask::new("b", j, 100).starting_at(40)).unwrap();
        s.add_precedence(a, b, Relation::StartToStart, 0).unwrap();

        let outcome = PrecedenceValidator::new().validate(&mut s);
        assert_eq!(outcome.violations[0].required_shift_ms, 10);
        assert!(outcome.violations[0].message.contains("'a' starts at"));
    }

    #[test]
    fn test_finish_relations_informational_by_default() {
        let mut s = Schedule::new();
        let j = s.add_job(NewJob::new("J"));
        let a = s.add_task(NewTask::new("a", j, 100)).unwrap();
        let b = s.add_task(NewTask::new("b", j, 10)).unwrap();
        s.add_precedence(a, b, Relation::FinishToFinish, 0).unwrap();
        s.add_precedence(a, b, Relation::StartToFinish, 50).unwrap();

        assert!(PrecedenceValidator::new().validate(&mut s).success);

        let enforced = PrecedenceValidator::new().with_finish_relations(true);
        let outcome = enforced.validate(&mut s);
        assert_eq!(outcome.violations_found, 2);
        // FF: b must end at ≥ 100 → start ≥ 90
        assert_eq!(outcome.violations[0].required_shift_ms, 90);
        // SF: b must end at ≥ 50 → start ≥ 40
        assert_eq!(outcome.violations[1].required_shift_ms, 40);
        assert!(outcome.violations[0].message.contains("'b' ends at"));
    }

    #[test]
    fn test_violations_follow_constraint_order() {
        let mut s = Schedule::new();
        let j = s.add_job(NewJob::new("J"));
        let a = s.add_task(NewTask::new("a", j, 100)).unwrap();
        let b = s.add_task(NewTask::new("b", j, 100)).unwrap();
        let c = s.add_task(NewTask::new("c", j, 100)).unwrap();
        s.add_finish_to_start(b, c, 0).unwrap();
        s.add_finish_to_start(a, b, 0).unwrap();

        let outcome = PrecedenceValidator::new().validate(&mut s);
        let order: Vec<(TaskId, TaskId)> = outcome
            .violations
            .iter()
            .map(|v| (v.predecessor, v.successor))
            .collect();
        assert_eq!(order, vec![(b, c), (a, b)]);
    }

    #[test]
    fn test_validate_node_precedences() {
        let mut nodes = vec![
            Node::machine(10, "Saw"),
            Node::task(1, "Cut", 100).on_machine(10),
            Node::task(2, "Sand", 50).on_machine(10).starting_at(60),
        ];
        let mut edges = vec![Edge::new(1, 1, 2)];

        let outcome = validate_node_precedences(&mut nodes, &mut edges);
        assert!(!outcome.success);
        assert_eq!(outcome.violations[0].successor, NodeId(2));
        assert_eq!(outcome.violations[0].required_shift_ms, 40);
        assert!(edges[0].violating);
        assert!(nodes[2].violating);

        nodes[2].start_ms = 100;
        let outcome = validate_node_precedences(&mut nodes, &mut edges);
        assert!(outcome.success);
        assert!(!edges[0].violating);
        assert!(!nodes[2].violating);
    }

    #[test]
    fn test_find_cycle() {
        let mut s = Schedule::new();
        let j = s.add_job(NewJob::new("J"));
        let a = s.add_task(NewTask::new("a", j, 10)).unwrap();
        let b = s.add_task(NewTask::new("b", j, 10)).unwrap();
        let c = s.add_task(NewTask::new("c", j, 10)).unwrap();
        s.add_finish_to_start(a, b, 0).unwrap();
        s.add_finish_to_start(b, c, 0).unwrap();
        assert!(find_cycle(&s).is_none());

        s.add_finish_to_start(c, b, 0).unwrap();
        assert_eq!(find_cycle(&s), Some(vec![b, c]));
    }

    #[test]
    fn test_find_cycle_diamond_is_acyclic() {
        // a → b → d, a → c → d
        let mut s = Schedule::new();
        let j = s.add_job(NewJob::new("J"));
        let a = s.add_task(NewTask::new("a", j, 10)).unwrap();
        let b = s.add_task(NewTask::new("b", j, 10)).unwrap();
        let c = s.add_task(NewTask::new("c", j, 10)).unwrap();
        let d = s.add_task(NewTask::new("d", j, 10)).unwrap();
        s.add_finish_to_start(a, b, 0).unwrap();
        s.add_finish_to_start(a, c, 0).unwrap();
        s.add_finish_to_start(b, d, 0).unwrap();
        s.add_finish_to_start(c, d, 0).unwrap();
        assert!(find_cycle(&s).is_none());
    }

    #[test]
    fn test_find_cycle_long_chain() {
        const LEN: u64 = 50_000;
        let mut nodes: Vec<Node> = (1..=LEN).map(|i| Node::task(i, format!("t{i}"), 1)).collect();
        let mut edges: Vec<Edge> = (1..LEN).map(|i| Edge::new(i, i, i + 1)).collect();
        assert!(find_cycle(&NodeGraph::new(&mut nodes, &mut edges)).is_none());

        // Closing the tail back onto the middle of the chain.
        edges.push(Edge::new(LEN, LEN, LEN / 2));
        let cycle = find_cycle(&NodeGraph::new(&mut nodes, &mut edges)).unwrap();
        assert_eq!(cycle.len() as u64, LEN / 2 + 1);
        assert_eq!(cycle.first(), Some(&NodeId(LEN / 2)));
        assert_eq!(cycle.last(), Some(&NodeId(LEN)));
    }
}
