//! Configured MILP scheduler.
//!
//! Pairs a [`SolverFactory`] with a [`SchedulerConfig`] so callers can solve
//! graphs without assembling a [`MilpScheduleBuilder`] each time.

use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::milp::MilpScheduleBuilder;
use crate::models::{DataflowGraph, OptimizationResult};
use crate::solver::{GoodLpFactory, SolverFactory};

use super::SchedulingMethod;

/// Optimal mapping and scheduling through a MILP solver.
///
/// Holds no per-solve state: `MilpScheduler<F>` is `Send + Sync` whenever
/// `F` is, and concurrent calls each build their own model.
///
/// # Example
///
/// ```
/// use dataflow_mapsched::config::SchedulerConfig;
/// use dataflow_mapsched::models::{Actor, DataflowGraph};
/// use dataflow_mapsched::scheduler::MilpScheduler;
///
/// let graph = DataflowGraph::new()
///     .with_actor(Actor::new("A", 2))
///     .with_actor(Actor::new("B", 3));
///
/// let scheduler = MilpScheduler::with_config(SchedulerConfig::new(2, 5));
/// let result = scheduler.run(&graph).unwrap();
/// assert_eq!(result.objective, Some(0.0));
/// assert_eq!(result.makespan(), Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct MilpScheduler<F = GoodLpFactory> {
    factory: F,
    config: SchedulerConfig,
}

impl MilpScheduler<GoodLpFactory> {
    /// Creates a scheduler backed by the bundled solver.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::new(GoodLpFactory, config)
    }
}

impl<F: SolverFactory> MilpScheduler<F> {
    /// Creates a scheduler with a custom solver factory.
    pub fn new(factory: F, config: SchedulerConfig) -> Self {
        Self { factory, config }
    }

    /// The configuration used by [`run`](Self::run).
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Solves `graph` with the configured core count and horizon.
    pub fn run(&self, graph: &DataflowGraph) -> Result<OptimizationResult> {
        MilpScheduleBuilder::from_config(graph, &self.config).solve(&self.factory)
    }

    /// Solves `graph` with explicit core count and horizon, keeping the
    /// configured encoding and model name.
    pub fn solve_with(
        &self,
        graph: &DataflowGraph,
        cores: usize,
        horizon: u32,
    ) -> Result<OptimizationResult> {
        MilpScheduleBuilder::new(graph, cores, horizon)
            .with_encoding(self.config.encoding)
            .with_model_name(self.config.model_name.clone())
            .solve(&self.factory)
    }
}

impl<F> SchedulingMethod for MilpScheduler<F>
where
    F: SolverFactory + Send + Sync,
{
    fn solve(
        &self,
        graph: &DataflowGraph,
        cores: usize,
        horizon: u32,
    ) -> Result<OptimizationResult> {
        self.solve_with(graph, cores, horizon)
    }
}
