//! Machine scheduling and precedence constraints for Gantt-style editors.
//!
//! Assigns start times to tasks on shared machines, validates precedence
//! constraints with lags, repairs violations and computes schedule quality
//! metrics. Every algorithm is written once against the
//! [`TaskNetwork`](network::TaskNetwork) interface and runs on both the
//! [`Schedule`](models::Schedule) aggregate and plain node/edge diagrams.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Schedule`, `Machine`, `Job`, `Task`,
//!   `Precedence`, `Availability`, diagram `Node`/`Edge`
//! - **`network`**: The `TaskNetwork` capability trait and its adapters
//! - **`validation`**: Precedence validation and cycle detection
//! - **`dispatching`**: Dispatching rules (SPT, LPT, FIFO)
//! - **`scheduler`**: Dispatch scheduler, greedy repair, compaction,
//!   critical chain, KPIs
//! - **`engine`**: One configured entry point for all operations
//!
//! # Time
//!
//! All times are `i64` milliseconds from the schedule epoch (t = 0).
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brucker (2007), "Scheduling Algorithms"
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

pub mod config;
pub mod dispatching;
pub mod engine;
pub mod error;
pub mod models;
pub mod network;
pub mod scheduler;
pub mod time;
pub mod validation;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Result, ScheduleError};
pub use network::{Outcome, TaskNetwork, Violation};
