//! Scheduling methods and KPI evaluation.
//!
//! Provides the [`SchedulingMethod`] seam, its MILP implementation and
//! schedule quality metrics.
//!
//! # Methods
//!
//! `MilpScheduler` solves the joint mapping and scheduling problem to
//! optimality (sum of start times) through a [`SolverFactory`](crate::solver::SolverFactory).
//!
//! # KPI
//!
//! `ScheduleKpi` computes makespan, sum of starts, per-core busy slots,
//! utilization and idle slots.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1-3
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod kpi;
mod milp;

pub use kpi::ScheduleKpi;
pub use milp::MilpScheduler;

use crate::error::Result;
use crate::models::{DataflowGraph, OptimizationResult};

/// A method that maps and schedules a dataflow graph onto `cores` identical
/// cores within `horizon` slots.
pub trait SchedulingMethod: Send + Sync {
    /// Solves one instance.
    fn solve(&self, graph: &DataflowGraph, cores: usize, horizon: u32)
        -> Result<OptimizationResult>;
}
