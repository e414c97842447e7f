//! `good_lp` backend using the pure-Rust `microlp` engine.
//!
//! `good_lp` builds a problem in one pass (variables, then objective, then
//! constraints), while [`MilpSolver`] is incremental. The solver buffers
//! variables and constraints and assembles the `good_lp` problem when
//! [`MilpSolver::optimize`] is called. A model can be optimized once.

use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::{debug, warn};

use super::{
    ConstraintSense, LinearExpr, MilpSolver, ObjectiveSense, SolverFactory, SolverFault,
    SolverStatus, VarId, VarKind,
};

/// Factory for [`GoodLpSolver`] models.
///
/// Creating a model never fails: the engine is linked in and needs no
/// license or external runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpFactory;

impl SolverFactory for GoodLpFactory {
    type Solver = GoodLpSolver;

    fn create(&self, model_name: &str) -> Result<GoodLpSolver, SolverFault> {
        Ok(GoodLpSolver::new(model_name))
    }
}

/// One `microlp` model.
pub struct GoodLpSolver {
    name: String,
    vars: ProblemVariables,
    handles: Vec<Variable>,
    constraints: Vec<good_lp::Constraint>,
    objective: Option<(LinearExpr, ObjectiveSense)>,
    values: Option<Vec<f64>>,
    objective_value: Option<f64>,
    optimized: bool,
}

impl GoodLpSolver {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: ProblemVariables::new(),
            handles: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            values: None,
            objective_value: None,
            optimized: false,
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn ensure_building(&self) -> Result<(), SolverFault> {
        if self.optimized {
            return Err(SolverFault::new(
                SolverFault::INVALID_STATE,
                format!("model '{}' was already optimized", self.name),
            ));
        }
        Ok(())
    }

    /// Converts to a `good_lp` expression, scaling every coefficient by `sign`.
    fn to_expression(&self, expr: &LinearExpr, sign: f64) -> Result<Expression, SolverFault> {
        let mut out = Expression::from(0.0);
        for &(coef, var) in expr.terms() {
            let handle = self.handles.get(var.index()).ok_or_else(|| {
                SolverFault::new(
                    SolverFault::UNKNOWN_VARIABLE,
                    format!("variable #{} is not part of model '{}'", var.index(), self.name),
                )
            })?;
            out.add_mul(sign * coef, *handle);
        }
        Ok(out)
    }
}

impl MilpSolver for GoodLpSolver {
    fn add_variable(
        &mut self,
        lower: f64,
        upper: f64,
        kind: VarKind,
        name: &str,
    ) -> Result<VarId, SolverFault> {
        self.ensure_building()?;
        let definition = variable().name(name);
        let definition = match kind {
            VarKind::Binary => definition.binary(),
            VarKind::Integer => definition.integer().min(lower).max(upper),
            VarKind::Continuous => definition.min(lower).max(upper),
        };
        let id = VarId(self.handles.len());
        self.handles.push(self.vars.add(definition));
        Ok(id)
    }

    fn add_constraint(
        &mut self,
        expr: LinearExpr,
        sense: ConstraintSense,
        rhs: f64,
        name: &str,
    ) -> Result<(), SolverFault> {
        self.ensure_building()?;
        // `a·x >= b` is stored as `-a·x <= -b`.
        let built = match sense {
            ConstraintSense::LessEqual => constraint::leq(self.to_expression(&expr, 1.0)?, rhs),
            ConstraintSense::Equal => constraint::eq(self.to_expression(&expr, 1.0)?, rhs),
            ConstraintSense::GreaterEqual => {
                constraint::leq(self.to_expression(&expr, -1.0)?, -rhs)
            }
        };
        debug!(model = %self.name, constraint = name, terms = expr.len(), "constraint added");
        self.constraints.push(built);
        Ok(())
    }

    fn set_objective(
        &mut self,
        expr: LinearExpr,
        sense: ObjectiveSense,
    ) -> Result<(), SolverFault> {
        self.ensure_building()?;
        // Validate handles eagerly so a bad objective fails at construction.
        self.to_expression(&expr, 1.0)?;
        self.objective = Some((expr, sense));
        Ok(())
    }

    fn optimize(&mut self) -> Result<SolverStatus, SolverFault> {
        self.ensure_building()?;
        self.optimized = true;

        let (objective, sense) = self.objective.take().unwrap_or_default();
        let expression = self.to_expression(&objective, 1.0)?;
        let vars = std::mem::replace(&mut self.vars, ProblemVariables::new());
        let unsolved = match sense {
            ObjectiveSense::Minimize => vars.minimise(expression),
            ObjectiveSense::Maximize => vars.maximise(expression),
        };
        let mut problem = unsolved.using(microlp);
        for c in self.constraints.drain(..) {
            problem.add_constraint(c);
        }

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = self.handles.iter().map(|&v| solution.value(v)).collect();
                self.objective_value =
                    objective.evaluate(|var| values.get(var.index()).copied());
                self.values = Some(values);
                Ok(SolverStatus::Optimal)
            }
            Err(ResolutionError::Infeasible) => Ok(SolverStatus::Infeasible),
            Err(ResolutionError::Unbounded) => Ok(SolverStatus::Unbounded),
            Err(e) => {
                warn!(model = %self.name, error = %e, "microlp failed");
                Err(SolverFault::new(SolverFault::BACKEND, e.to_string()))
            }
        }
    }

    fn value(&self, var: VarId) -> Option<f64> {
        self.values.as_ref()?.get(var.index()).copied()
    }

    fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    fn variable_count(&self) -> usize {
        self.handles.len()
    }

    fn constraint_count(&self) -> usize {
        // Constraints are moved into the problem on optimize.
        if self.optimized {
            0
        } else {
            self.constraints.len()
        }
    }
}
