//! Scheduling domain models.
//!
//! Two shapes describe the same problem:
//!
//! - The [`Schedule`] aggregate with first-class [`Machine`], [`Job`],
//!   [`Task`] and [`Precedence`] records.
//! - A free-form diagram of [`Node`]s and [`Edge`]s, where edges stand in
//!   for zero-lag finish-to-start precedence.
//!
//! # Domain Mappings
//!
//! | u-gantt | Manufacturing | Project plan |
//! |---------|---------------|--------------|
//! | Job | Order | Work package |
//! | Task | Operation | Activity |
//! | Machine | Machine | Team lane |
//! | Precedence | Routing step | Dependency |

mod availability;
mod graph;
mod ids;
mod job;
mod machine;
mod precedence;
mod schedule;
mod task;

pub use availability::{Availability, TimeWindow};
pub use graph::{Edge, Node, NodeKind};
pub use ids::{EdgeId, IdSequence, JobId, MachineId, NodeId, PrecedenceId, TaskId};
pub use job::{Job, NewJob};
pub use machine::Machine;
pub use precedence::{Precedence, Relation};
pub use schedule::Schedule;
pub use task::{NewTask, Task};
