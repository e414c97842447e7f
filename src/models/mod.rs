//! Mapping and scheduling domain models.
//!
//! Input side: a [`DataflowGraph`] of [`Actor`]s linked by precedence
//! [`Edge`]s. Output side: an [`OptimizationResult`] carrying the solver
//! status and, when optimal, a [`Schedule`] of per-actor [`ActorSlot`]s.
//!
//! # Time Representation
//! Time is discretized into slots `0..horizon`. An actor of duration `d`
//! starting at slot `t` occupies slots `t..t + d` and finishes at `t + d`.

mod actor;
mod graph;
mod schedule;

pub use actor::{Actor, Edge};
pub use graph::DataflowGraph;
pub use schedule::{
    ActorSlot, OptimizationResult, Schedule, SolveStatus, Violation, ViolationType,
};
