//! Schedulers, repair, compaction and KPI evaluation.
//!
//! Every algorithm here runs on any [`TaskNetwork`](crate::network::TaskNetwork),
//! so the schedule aggregate and node diagrams share one implementation.
//!
//! # Algorithms
//!
//! - [`DispatchScheduler`]: single forward pass in SPT / LPT / FIFO order,
//!   earliest machine-and-predecessor-ready placement.
//! - [`RepairEngine`]: bounded greedy forward shifting of violating successors.
//! - [`Compactor`]: left shift of single tasks into the earliest free gap.
//! - [`mark_critical_chain`]: flags tasks on a tight path to the makespan.
//!
//! # KPI
//!
//! [`ScheduleMetrics`] computes makespan, utilization, flow time, tardiness
//! and violation counts.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod compaction;
mod critical;
mod dispatch;
mod kpi;
mod repair;

pub use compaction::Compactor;
pub use critical::mark_critical_chain;
pub use dispatch::{schedule_nodes, schedule_nodes_spt, DispatchScheduler};
pub use kpi::ScheduleMetrics;
pub use repair::{auto_fix_node_violations, RepairEngine};
