//! Solver capability consumed by the MILP formulations.
//!
//! The formulations never talk to a concrete engine. They drive a
//! [`MilpSolver`] obtained from a [`SolverFactory`]: add variables, add named
//! linear constraints, set the objective, optimize, read values back.
//!
//! Disposal is ownership: a solver handle releases everything it holds when
//! it is dropped, so the model is freed on every exit path of a solve call,
//! including early returns through `?`.
//!
//! [`GoodLpFactory`] is the bundled backend (pure Rust, via `good_lp` and the
//! `microlp` branch-and-bound engine).

mod good_lp_backend;

pub use good_lp_backend::{GoodLpFactory, GoodLpSolver};

use thiserror::Error;

/// Handle to a variable inside one solver model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Handle for the `index`-th variable of a model. For backend implementors.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Position of the variable in creation order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// 0/1 variable. Bounds are forced to `[0, 1]`.
    Binary,
    /// Integer variable within the given bounds.
    Integer,
    /// Real variable within the given bounds.
    Continuous,
}

/// Relation between a linear expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// `expr <= rhs`
    LessEqual,
    /// `expr == rhs`
    Equal,
    /// `expr >= rhs`
    GreaterEqual,
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

/// Terminal status reported by [`MilpSolver::optimize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimum; values are readable.
    Optimal,
    /// The constraints admit no solution.
    Infeasible,
    /// The objective is unbounded in the optimization direction.
    Unbounded,
    /// Engine-specific non-success status code.
    Error(i32),
}

/// Failure raised by a solver backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct SolverFault {
    /// Backend status code.
    pub code: i32,
    /// Human-readable description.
    pub message: String,
}

impl SolverFault {
    /// Generic backend failure.
    pub const BACKEND: i32 = 1;
    /// Operation not valid in the current model state.
    pub const INVALID_STATE: i32 = 2;
    /// A variable handle does not belong to the model.
    pub const UNKNOWN_VARIABLE: i32 = 3;
    /// Solver output could not be turned into a schedule.
    pub const DECODE: i32 = 4;

    /// Creates a fault.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Sparse linear expression `Σ coefficient · variable`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(f64, VarId)>,
}

impl LinearExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty expression with room for `capacity` terms.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            terms: Vec::with_capacity(capacity),
        }
    }

    /// Appends `coefficient · var`.
    pub fn add_term(&mut self, coefficient: f64, var: VarId) {
        self.terms.push((coefficient, var));
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[(f64, VarId)] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the expression has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression; `None` if any variable has no value.
    pub fn evaluate(&self, value: impl Fn(VarId) -> Option<f64>) -> Option<f64> {
        self.terms
            .iter()
            .try_fold(0.0, |acc, &(coef, var)| Some(acc + coef * value(var)?))
    }
}

impl FromIterator<(f64, VarId)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (f64, VarId)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// A MILP model under construction, owned by exactly one solve call.
pub trait MilpSolver {
    /// Adds a variable with bounds `[lower, upper]`.
    fn add_variable(
        &mut self,
        lower: f64,
        upper: f64,
        kind: VarKind,
        name: &str,
    ) -> Result<VarId, SolverFault>;

    /// Adds the named constraint `expr (sense) rhs`.
    fn add_constraint(
        &mut self,
        expr: LinearExpr,
        sense: ConstraintSense,
        rhs: f64,
        name: &str,
    ) -> Result<(), SolverFault>;

    /// Sets the objective function.
    fn set_objective(&mut self, expr: LinearExpr, sense: ObjectiveSense)
        -> Result<(), SolverFault>;

    /// Runs the optimization to a terminal status.
    fn optimize(&mut self) -> Result<SolverStatus, SolverFault>;

    /// Value of a variable. Only meaningful after [`SolverStatus::Optimal`].
    fn value(&self, var: VarId) -> Option<f64>;

    /// Objective value. Only meaningful after [`SolverStatus::Optimal`].
    fn objective_value(&self) -> Option<f64>;

    /// Number of variables added so far.
    fn variable_count(&self) -> usize;

    /// Number of constraints added so far.
    fn constraint_count(&self) -> usize;
}

/// Creates solver models, one per solve call.
///
/// A failure here means the solver environment itself is unusable
/// (licensing, missing runtime) and surfaces as
/// [`ScheduleError::SolverUnavailable`](crate::ScheduleError::SolverUnavailable).
pub trait SolverFactory {
    /// Model type produced by this factory.
    type Solver: MilpSolver;

    /// Creates an empty model.
    fn create(&self, model_name: &str) -> Result<Self::Solver, SolverFault>;
}
