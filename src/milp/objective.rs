//! Objective of the time-indexed formulation.
//!
//! Minimizes `Σ_a Σ_t t · S[a,t]`, the sum of actor start times. This is a
//! latency surrogate, not the makespan: two schedules with the same
//! makespan can have different objectives and vice versa. The makespan is
//! reported separately on the decoded [`Schedule`](crate::models::Schedule).

use crate::error::Result;
use crate::solver::{LinearExpr, MilpSolver, ObjectiveSense};

use super::variables::TimeIndexedVars;

/// Sets the sum-of-start-times objective.
pub fn set_objective<S: MilpSolver>(vars: &TimeIndexedVars, solver: &mut S) -> Result<()> {
    let expr: LinearExpr = vars
        .s
        .iter()
        .flat_map(|starts| starts.iter().enumerate().map(|(t, &s)| (t as f64, s)))
        .collect();
    solver.set_objective(expr, ObjectiveSense::Minimize)?;
    Ok(())
}
