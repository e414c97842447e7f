//! MILP-based mapping and scheduling formulation.
//!
//! Builds a mixed binary integer program from a dataflow graph, a core
//! count and a time horizon, solves it through a [`SolverFactory`], and
//! decodes the optimum into a [`Schedule`].
//!
//! # Formulations
//!
//! - [`StartEncoding::TimeIndexed`] (default): one-hot start slots and
//!   per-slot occupancy binaries, see [`variables`], [`constraints`],
//!   [`objective`].
//! - [`StartEncoding::BigM`]: integer starts with pairwise disjunctions,
//!   see [`big_m`].
//!
//! Both minimize the sum of actor start times.
//!
//! # Per-call state
//! Every [`MilpScheduleBuilder::solve`] call creates its own solver model and
//! variable set and drops them before returning. Nothing is cached on the
//! builder, so one builder can be shared by concurrent callers.
//!
//! # Reference
//! - Pritsker, Watters & Wolfe (1969), "Multiproject scheduling with limited
//!   resources: a zero-one programming approach"
//! - Ku & Beck (2016), "Mixed Integer Programming models for job shop
//!   scheduling: a computational analysis"

pub mod big_m;
pub mod constraints;
pub mod decode;
pub mod objective;
pub mod variables;

#[cfg(test)]
mod tests;

use tracing::{debug, info};

use crate::config::{SchedulerConfig, StartEncoding, DEFAULT_MODEL_NAME};
use crate::error::{Result, ScheduleError};
use crate::models::{DataflowGraph, OptimizationResult, Schedule};
use crate::solver::{MilpSolver, SolverFactory, SolverStatus};
use crate::validation::validate_graph;

use big_m::BigMVars;
use variables::TimeIndexedVars;

/// Variable handles of a built model, by encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formulation {
    TimeIndexed(TimeIndexedVars),
    BigM(BigMVars),
}

impl Formulation {
    /// Decodes solved values into a schedule.
    pub fn decode<S: MilpSolver>(
        &self,
        graph: &DataflowGraph,
        horizon: u32,
        solver: &S,
    ) -> Result<Schedule> {
        match self {
            Formulation::TimeIndexed(vars) => decode::decode(graph, vars, solver),
            Formulation::BigM(vars) => big_m::decode(graph, horizon, vars, solver),
        }
    }
}

/// Builds and solves the mapping/scheduling MILP for one graph.
///
/// # Example
/// ```
/// use dataflow_mapsched::milp::MilpScheduleBuilder;
/// use dataflow_mapsched::models::{Actor, DataflowGraph, SolveStatus};
/// use dataflow_mapsched::solver::GoodLpFactory;
///
/// let graph = DataflowGraph::new()
///     .with_actor(Actor::new("A", 2))
///     .with_actor(Actor::new("B", 3))
///     .with_edge("A", "B");
///
/// let result = MilpScheduleBuilder::new(&graph, 1, 10)
///     .solve(&GoodLpFactory)
///     .unwrap();
/// assert_eq!(result.status, SolveStatus::Optimal);
/// assert_eq!(result.objective, Some(2.0));
/// assert_eq!(result.makespan(), Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct MilpScheduleBuilder<'a> {
    graph: &'a DataflowGraph,
    cores: usize,
    horizon: u32,
    encoding: StartEncoding,
    model_name: String,
}

impl<'a> MilpScheduleBuilder<'a> {
    /// Creates a builder for `cores` identical cores and `horizon` slots.
    pub fn new(graph: &'a DataflowGraph, cores: usize, horizon: u32) -> Self {
        Self {
            graph,
            cores,
            horizon,
            encoding: StartEncoding::default(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }

    /// Creates a builder from a configuration.
    pub fn from_config(graph: &'a DataflowGraph, config: &SchedulerConfig) -> Self {
        Self::new(graph, config.cores, config.horizon)
            .with_encoding(config.encoding)
            .with_model_name(config.model_name.clone())
    }

    /// Sets the start-time encoding.
    pub fn with_encoding(mut self, encoding: StartEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the solver model name.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Checks parameters, graph structure and the horizon precondition.
    ///
    /// Runs before any solver model exists.
    pub fn check(&self) -> Result<()> {
        if self.cores == 0 {
            return Err(ScheduleError::InvalidParameter(
                "cores must be at least 1".into(),
            ));
        }
        if self.horizon == 0 {
            return Err(ScheduleError::InvalidParameter(
                "horizon must be at least 1".into(),
            ));
        }
        validate_graph(self.graph).map_err(ScheduleError::InvalidGraph)?;
        variables::check_horizon(self.graph, self.horizon)
    }

    /// Adds variables, constraints and objective to an empty model.
    pub fn build<S: MilpSolver>(&self, solver: &mut S) -> Result<Formulation> {
        match self.encoding {
            StartEncoding::TimeIndexed => {
                let vars = variables::allocate(self.graph, self.cores, self.horizon, solver)?;
                constraints::add_constraints(self.graph, self.cores, self.horizon, &vars, solver)?;
                objective::set_objective(&vars, solver)?;
                Ok(Formulation::TimeIndexed(vars))
            }
            StartEncoding::BigM => {
                let vars = big_m::build(self.graph, self.cores, self.horizon, solver)?;
                Ok(Formulation::BigM(vars))
            }
        }
    }

    /// Builds the model, optimizes it and decodes the result.
    ///
    /// Infeasible and unbounded models are returned as data. The solver
    /// model is dropped before this returns, on every path.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidParameter`] / [`ScheduleError::InvalidGraph`]
    /// - [`ScheduleError::InfeasibleHorizon`], before any solver is created
    /// - [`ScheduleError::SolverUnavailable`] if the factory fails
    /// - [`ScheduleError::SolverError`] for any other solver failure
    pub fn solve<F: SolverFactory>(&self, factory: &F) -> Result<OptimizationResult> {
        info!(
            event = "solve_start",
            actors = self.graph.actor_count(),
            edges = self.graph.edge_count(),
            cores = self.cores,
            horizon = self.horizon,
            encoding = ?self.encoding,
        );

        self.check()?;

        if self.graph.is_empty() {
            info!(event = "solve_end", status = "optimal", objective = 0.0, makespan = 0);
            return Ok(OptimizationResult::optimal(0.0, Schedule::new()));
        }
        if !self.graph.is_acyclic() {
            debug!("precedence graph has a cycle; the model will be infeasible");
        }

        let mut solver = factory
            .create(&self.model_name)
            .map_err(|fault| ScheduleError::SolverUnavailable(fault.to_string()))?;

        let formulation = self.build(&mut solver)?;
        debug!(
            model = %self.model_name,
            variables = solver.variable_count(),
            constraints = solver.constraint_count(),
            "model built"
        );

        let result = match solver.optimize()? {
            SolverStatus::Optimal => {
                let schedule = formulation.decode(self.graph, self.horizon, &solver)?;
                let objective = solver
                    .objective_value()
                    .map(f64::round)
                    .unwrap_or(schedule.sum_of_starts() as f64);
                OptimizationResult::optimal(objective, schedule)
            }
            SolverStatus::Infeasible => OptimizationResult::infeasible(),
            SolverStatus::Unbounded => OptimizationResult::unbounded(),
            SolverStatus::Error(code) => {
                return Err(ScheduleError::SolverError {
                    code,
                    message: format!("model '{}' stopped without a solution", self.model_name),
                });
            }
        };

        info!(
            event = "solve_end",
            status = ?result.status,
            objective = ?result.objective,
            makespan = ?result.makespan(),
        );
        Ok(result)
    }
}
