//! Optimal mapping and scheduling of dataflow actors on identical cores.
//!
//! Given a dataflow graph (actors with integer durations, precedence edges),
//! a core count and a time horizon, builds a mixed binary integer program
//! that jointly decides which core runs each actor and in which slot it
//! starts, solves it, and decodes the optimum into a concrete schedule.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Actor`, `Edge`, `DataflowGraph`,
//!   `Schedule`, `ActorSlot`, `OptimizationResult`, `Violation`
//! - **`validation`**: Input integrity checks and schedule verification
//! - **`solver`**: The `MilpSolver` capability and the bundled `good_lp` backend
//! - **`milp`**: Variable allocation, constraint generation, objective,
//!   decoding, and the big-M alternative encoding
//! - **`scheduler`**: `SchedulingMethod`, `MilpScheduler`, `ScheduleKpi`
//! - **`registry`**: Named scheduling methods
//! - **`config`**: TOML-loadable `SchedulerConfig`
//!
//! # Example
//!
//! ```
//! use dataflow_mapsched::models::{Actor, DataflowGraph};
//!
//! let graph = DataflowGraph::new()
//!     .with_actor(Actor::new("A", 3))
//!     .with_actor(Actor::new("B", 3))
//!     .with_actor(Actor::new("C", 3));
//!
//! let result = dataflow_mapsched::schedule(&graph, 1, 9).unwrap();
//! assert_eq!(result.objective, Some(9.0));
//! assert_eq!(result.makespan(), Some(9));
//! ```
//!
//! # References
//!
//! - Pritsker, Watters & Wolfe (1969), "Multiproject scheduling with limited
//!   resources: a zero-one programming approach"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Blazewicz et al. (2019), "Handbook on Scheduling"

pub mod config;
pub mod error;
pub mod milp;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod solver;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use error::{Result, ScheduleError};

use milp::MilpScheduleBuilder;
use models::{DataflowGraph, OptimizationResult};
use solver::GoodLpFactory;

/// Solves `graph` on `cores` cores within `horizon` slots with the default
/// time-indexed encoding and the bundled solver.
pub fn schedule(graph: &DataflowGraph, cores: usize, horizon: u32) -> Result<OptimizationResult> {
    MilpScheduleBuilder::new(graph, cores, horizon).solve(&GoodLpFactory)
}
