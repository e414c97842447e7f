//! Constraint families of the time-indexed formulation.
//!
//! | Family | Scope | Constraint |
//! |--------|-------|------------|
//! | start window | `(a, t)` | `Σ_{t'=t}^{t+d-1} Σ_c X[a,c,t'] ≥ d · S[a,t]` |
//! | resource link | `(a, c)` | `Σ_t X[a,c,t] ≤ d · R[a,c]` |
//! | duration | `a` | `Σ_{c,t} X[a,c,t] = d` |
//! | one start | `a` | `Σ_t S[a,t] = 1` |
//! | one resource | `a` | `Σ_c R[a,c] = 1` |
//! | exclusion | `(c, t)` | `Σ_a X[a,c,t] ≤ 1` |
//! | precedence | edge `(u, v)` | `Σ_t t·S[v,t] − Σ_t t·S[u,t] ≥ d(u)` |
//!
//! Start times are one-hot, so `Σ_t t·S[a,t]` is exactly the start slot of
//! `a` and precedence needs no big-M constant. All coefficients are integral.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::models::DataflowGraph;
use crate::solver::{ConstraintSense, LinearExpr, MilpSolver};

use super::variables::TimeIndexedVars;

/// Emits every constraint family. Returns the number of constraints added.
pub fn add_constraints<S: MilpSolver>(
    graph: &DataflowGraph,
    cores: usize,
    horizon: u32,
    vars: &TimeIndexedVars,
    solver: &mut S,
) -> Result<usize> {
    let mut count = 0;
    count += start_window(graph, cores, vars, solver)?;
    count += resource_link(graph, cores, horizon, vars, solver)?;
    count += duration(graph, cores, horizon, vars, solver)?;
    count += one_hot(graph, vars, solver)?;
    count += exclusion(graph, cores, horizon, vars, solver)?;
    count += precedence(graph, vars, solver)?;
    debug!(constraints = count, "constraints generated");
    Ok(count)
}

/// Occupancy is confined to the declared execution window.
fn start_window<S: MilpSolver>(
    graph: &DataflowGraph,
    cores: usize,
    vars: &TimeIndexedVars,
    solver: &mut S,
) -> Result<usize> {
    let mut count = 0;
    for (a, actor) in graph.actors.iter().enumerate() {
        let dur = actor.duration as usize;
        for (t, &start) in vars.s[a].iter().enumerate() {
            let mut expr = LinearExpr::with_capacity(dur * cores + 1);
            for slot in t..t + dur {
                for c in 0..cores {
                    expr.add_term(1.0, vars.x[a][c][slot]);
                }
            }
            expr.add_term(-f64::from(actor.duration), start);
            let name = format!("start_window_{}_t{t}", actor.id);
            solver.add_constraint(expr, ConstraintSense::GreaterEqual, 0.0, &name)?;
            count += 1;
        }
    }
    Ok(count)
}

/// Occupancy only on the mapped core.
fn resource_link<S: MilpSolver>(
    graph: &DataflowGraph,
    cores: usize,
    horizon: u32,
    vars: &TimeIndexedVars,
    solver: &mut S,
) -> Result<usize> {
    let mut count = 0;
    for (a, actor) in graph.actors.iter().enumerate() {
        for c in 0..cores {
            let mut expr = LinearExpr::with_capacity(horizon as usize + 1);
            for &x in &vars.x[a][c] {
                expr.add_term(1.0, x);
            }
            expr.add_term(-f64::from(actor.duration), vars.r[a][c]);
            let name = format!("resource_{}_c{c}", actor.id);
            solver.add_constraint(expr, ConstraintSense::LessEqual, 0.0, &name)?;
            count += 1;
        }
    }
    Ok(count)
}

/// Total occupancy equals the duration.
fn duration<S: MilpSolver>(
    graph: &DataflowGraph,
    cores: usize,
    horizon: u32,
    vars: &TimeIndexedVars,
    solver: &mut S,
) -> Result<usize> {
    for (a, actor) in graph.actors.iter().enumerate() {
        let mut expr = LinearExpr::with_capacity(cores * horizon as usize);
        for &x in vars.x[a].iter().flatten() {
            expr.add_term(1.0, x);
        }
        let name = format!("duration_{}", actor.id);
        solver.add_constraint(
            expr,
            ConstraintSense::Equal,
            f64::from(actor.duration),
            &name,
        )?;
    }
    Ok(graph.actor_count())
}

/// Exactly one start slot and exactly one core per actor.
fn one_hot<S: MilpSolver>(
    graph: &DataflowGraph,
    vars: &TimeIndexedVars,
    solver: &mut S,
) -> Result<usize> {
    for (a, actor) in graph.actors.iter().enumerate() {
        let starts: LinearExpr = vars.s[a].iter().map(|&s| (1.0, s)).collect();
        let name = format!("one_start_{}", actor.id);
        solver.add_constraint(starts, ConstraintSense::Equal, 1.0, &name)?;

        let mapping: LinearExpr = vars.r[a].iter().map(|&r| (1.0, r)).collect();
        let name = format!("one_resource_{}", actor.id);
        solver.add_constraint(mapping, ConstraintSense::Equal, 1.0, &name)?;
    }
    Ok(2 * graph.actor_count())
}

/// At most one actor per core and slot.
fn exclusion<S: MilpSolver>(
    graph: &DataflowGraph,
    cores: usize,
    horizon: u32,
    vars: &TimeIndexedVars,
    solver: &mut S,
) -> Result<usize> {
    let slots = horizon as usize;
    for c in 0..cores {
        for t in 0..slots {
            let expr: LinearExpr = (0..graph.actor_count())
                .map(|a| (1.0, vars.x[a][c][t]))
                .collect();
            let name = format!("exclusive_c{c}_t{t}");
            solver.add_constraint(expr, ConstraintSense::LessEqual, 1.0, &name)?;
        }
    }
    Ok(cores * slots)
}

/// The target of an edge starts no earlier than its source finishes.
fn precedence<S: MilpSolver>(
    graph: &DataflowGraph,
    vars: &TimeIndexedVars,
    solver: &mut S,
) -> Result<usize> {
    let index: HashMap<&str, usize> = graph
        .actors
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id.as_str(), i))
        .collect();

    for edge in &graph.edges {
        let (Some(&u), Some(&v)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            return Err(ScheduleError::InvalidParameter(format!(
                "edge '{}' -> '{}' references an unknown actor",
                edge.source, edge.target
            )));
        };

        let mut expr = LinearExpr::with_capacity(vars.s[u].len() + vars.s[v].len());
        for (t, &s) in vars.s[v].iter().enumerate() {
            expr.add_term(t as f64, s);
        }
        for (t, &s) in vars.s[u].iter().enumerate() {
            expr.add_term(-(t as f64), s);
        }
        let name = format!("precedence_{}_to_{}", edge.source, edge.target);
        solver.add_constraint(
            expr,
            ConstraintSense::GreaterEqual,
            f64::from(graph.actors[u].duration),
            &name,
        )?;
    }
    Ok(graph.edge_count())
}
