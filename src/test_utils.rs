//! Recording solver backend for tests.
//!
//! [`RecordingFactory`] hands out [`RecordingSolver`]s that store every
//! variable and constraint they receive, return a scripted status from
//! `optimize`, and report creation and drop counts through a shared
//! [`Probe`], so tests can observe model shape and disposal without a real
//! engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::solver::{
    ConstraintSense, LinearExpr, MilpSolver, ObjectiveSense, SolverFactory, SolverFault,
    SolverStatus, VarId, VarKind,
};

/// Counters shared by a factory and all solvers it created.
#[derive(Debug, Default)]
pub struct Probe {
    created: AtomicUsize,
    dropped: AtomicUsize,
}

impl Probe {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedVariable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub kind: VarKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedConstraint {
    pub expr: LinearExpr,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

/// Scripted behaviour of `create` / `optimize`.
#[derive(Debug, Clone)]
enum Script {
    Status(SolverStatus),
    OptimizeFault(SolverFault),
    CreateFault(SolverFault),
    /// Fail the n-th `add_constraint` call (0-based).
    ConstraintFault(usize),
}

#[derive(Debug, Clone)]
pub struct RecordingFactory {
    probe: Arc<Probe>,
    script: Script,
}

impl RecordingFactory {
    fn with_script(script: Script) -> Self {
        Self {
            probe: Arc::new(Probe::default()),
            script,
        }
    }

    /// `optimize` reports `Optimal` but sets no values.
    pub fn optimal() -> Self {
        Self::with_script(Script::Status(SolverStatus::Optimal))
    }

    pub fn status(status: SolverStatus) -> Self {
        Self::with_script(Script::Status(status))
    }

    pub fn failing_optimize(fault: SolverFault) -> Self {
        Self::with_script(Script::OptimizeFault(fault))
    }

    pub fn unavailable(fault: SolverFault) -> Self {
        Self::with_script(Script::CreateFault(fault))
    }

    pub fn failing_constraint(index: usize) -> Self {
        Self::with_script(Script::ConstraintFault(index))
    }

    pub fn probe(&self) -> Arc<Probe> {
        Arc::clone(&self.probe)
    }
}

impl SolverFactory for RecordingFactory {
    type Solver = RecordingSolver;

    fn create(&self, _model_name: &str) -> Result<RecordingSolver, SolverFault> {
        if let Script::CreateFault(fault) = &self.script {
            return Err(fault.clone());
        }
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Ok(RecordingSolver {
            probe: Arc::clone(&self.probe),
            script: self.script.clone(),
            variables: Vec::new(),
            constraints: Vec::new(),
            by_name: HashMap::new(),
            objective: None,
            values: HashMap::new(),
        })
    }
}

pub struct RecordingSolver {
    probe: Arc<Probe>,
    script: Script,
    variables: Vec<RecordedVariable>,
    constraints: Vec<RecordedConstraint>,
    by_name: HashMap<String, usize>,
    objective: Option<(LinearExpr, ObjectiveSense)>,
    values: HashMap<VarId, f64>,
}

impl RecordingSolver {
    pub fn set_value(&mut self, var: VarId, value: f64) {
        self.values.insert(var, value);
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    pub fn variable(&self, name: &str) -> Option<&RecordedVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn constraint(&self, name: &str) -> Option<&RecordedConstraint> {
        self.by_name.get(name).map(|&i| &self.constraints[i])
    }

    pub fn objective(&self) -> Option<&(LinearExpr, ObjectiveSense)> {
        self.objective.as_ref()
    }
}

impl Drop for RecordingSolver {
    fn drop(&mut self) {
        self.probe.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

impl MilpSolver for RecordingSolver {
    fn add_variable(
        &mut self,
        lower: f64,
        upper: f64,
        kind: VarKind,
        name: &str,
    ) -> Result<VarId, SolverFault> {
        self.variables.push(RecordedVariable {
            name: name.to_string(),
            lower,
            upper,
            kind,
        });
        Ok(VarId::from_index(self.variables.len() - 1))
    }

    fn add_constraint(
        &mut self,
        expr: LinearExpr,
        sense: ConstraintSense,
        rhs: f64,
        name: &str,
    ) -> Result<(), SolverFault> {
        if let Script::ConstraintFault(n) = self.script {
            if n == self.constraints.len() {
                return Err(SolverFault::new(
                    SolverFault::BACKEND,
                    format!("rejected constraint {name}"),
                ));
            }
        }
        self.by_name.insert(name.to_string(), self.constraints.len());
        self.constraints.push(RecordedConstraint { expr, sense, rhs });
        Ok(())
    }

    fn set_objective(
        &mut self,
        expr: LinearExpr,
        sense: ObjectiveSense,
    ) -> Result<(), SolverFault> {
        self.objective = Some((expr, sense));
        Ok(())
    }

    fn optimize(&mut self) -> Result<SolverStatus, SolverFault> {
        match &self.script {
            Script::OptimizeFault(fault) => Err(fault.clone()),
            Script::Status(status) => Ok(*status),
            _ => Ok(SolverStatus::Optimal),
        }
    }

    fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(&var).copied()
    }

    fn objective_value(&self) -> Option<f64> {
        let (expr, _) = self.objective.as_ref()?;
        expr.evaluate(|v| Some(self.value(v).unwrap_or(0.0)))
    }

    fn variable_count(&self) -> usize {
        self.variables.len()
    }

    fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

/// Wraps a real backend and counts model creation and drops through a
/// [`Probe`].
#[derive(Debug, Clone, Default)]
pub struct CountingFactory<F> {
    inner: F,
    probe: Arc<Probe>,
}

impl<F: SolverFactory> CountingFactory<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            probe: Arc::new(Probe::default()),
        }
    }

    pub fn probe(&self) -> Arc<Probe> {
        Arc::clone(&self.probe)
    }
}

impl<F: SolverFactory> SolverFactory for CountingFactory<F> {
    type Solver = CountingSolver<F::Solver>;

    fn create(&self, model_name: &str) -> Result<Self::Solver, SolverFault> {
        let inner = self.inner.create(model_name)?;
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Ok(CountingSolver {
            inner,
            probe: Arc::clone(&self.probe),
        })
    }
}

pub struct CountingSolver<S> {
    inner: S,
    probe: Arc<Probe>,
}

impl<S> Drop for CountingSolver<S> {
    fn drop(&mut self) {
        self.probe.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: MilpSolver> MilpSolver for CountingSolver<S> {
    fn add_variable(
        &mut self,
        lower: f64,
        upper: f64,
        kind: VarKind,
        name: &str,
    ) -> Result<VarId, SolverFault> {
        self.inner.add_variable(lower, upper, kind, name)
    }

    fn add_constraint(
        &mut self,
        expr: LinearExpr,
        sense: ConstraintSense,
        rhs: f64,
        name: &str,
    ) -> Result<(), SolverFault> {
        self.inner.add_constraint(expr, sense, rhs, name)
    }

    fn set_objective(
        &mut self,
        expr: LinearExpr,
        sense: ObjectiveSense,
    ) -> Result<(), SolverFault> {
        self.inner.set_objective(expr, sense)
    }

    fn optimize(&mut self) -> Result<SolverStatus, SolverFault> {
        self.inner.optimize()
    }

    fn value(&self, var: VarId) -> Option<f64> {
        self.inner.value(var)
    }

    fn objective_value(&self) -> Option<f64> {
        self.inner.objective_value()
    }

    fn variable_count(&self) -> usize {
        self.inner.variable_count()
    }

    fn constraint_count(&self) -> usize {
        self.inner.constraint_count()
    }
}
