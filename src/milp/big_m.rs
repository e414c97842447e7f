//! Big-M formulation with integer start times.
//!
//! Variables per actor `a`: one integer start `s_a ∈ [0, T − d(a)]` and the
//! mapping binaries `R[a,c]`. Per unordered actor pair `{a, b}`: one
//! ordering binary `y_ab` (1 means `a` runs before `b` when they share a
//! core). With `M = T`, for every core `c`:
//!
//! ```text
//! s_a − s_b + M·y_ab + M·R[a,c] + M·R[b,c] ≤ 3M − d(a)
//! s_b − s_a − M·y_ab + M·R[a,c] + M·R[b,c] ≤ 2M − d(b)
//! ```
//!
//! Unless the pair shares core `c`, both rows relax to `s + d − s' ≤ M`,
//! which every start inside `[0, T − d]` satisfies. This
//! encoding has the same optimum as the time-indexed one with `O(n²·C)`
//! constraints instead of `O(n·C·T)` variables; its LP relaxation is weaker.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::models::{ActorSlot, DataflowGraph, Schedule};
use crate::solver::{ConstraintSense, LinearExpr, MilpSolver, ObjectiveSense, VarId, VarKind};

use super::decode::{decode_fault, selected};
use super::variables::check_horizon;

/// Variable handles of one big-M model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigMVars {
    /// `start[a]`
    pub(crate) start: Vec<VarId>,
    /// `r[a][c]`
    pub(crate) r: Vec<Vec<VarId>>,
    /// `((a, b), y_ab)` for `a < b`
    pub(crate) order: Vec<((usize, usize), VarId)>,
}

impl BigMVars {
    /// Integer start variable of one actor.
    pub fn start(&self, actor: usize) -> Option<VarId> {
        self.start.get(actor).copied()
    }

    /// Mapping variables `R[a,·]` of one actor, indexed by core.
    pub fn mappings(&self, actor: usize) -> &[VarId] {
        self.r.get(actor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of ordering binaries.
    pub fn pair_count(&self) -> usize {
        self.order.len()
    }
}

/// Allocates variables and emits constraints and objective.
pub fn build<S: MilpSolver>(
    graph: &DataflowGraph,
    cores: usize,
    horizon: u32,
    solver: &mut S,
) -> Result<BigMVars> {
    check_horizon(graph, horizon)?;

    let n = graph.actor_count();
    let big_m = f64::from(horizon);
    let mut vars = BigMVars {
        start: Vec::with_capacity(n),
        r: Vec::with_capacity(n),
        order: Vec::with_capacity(n * n.saturating_sub(1) / 2),
    };

    for actor in &graph.actors {
        let latest = f64::from(horizon - actor.duration);
        let name = format!("s_{}", actor.id);
        vars.start
            .push(solver.add_variable(0.0, latest, VarKind::Integer, &name)?);

        let mut mapping = Vec::with_capacity(cores);
        for c in 0..cores {
            let name = format!("R_{}_c{c}", actor.id);
            mapping.push(solver.add_variable(0.0, 1.0, VarKind::Binary, &name)?);
        }
        vars.r.push(mapping);
    }

    for a in 0..n {
        for b in a + 1..n {
            let name = format!("y_{}_{}", graph.actors[a].id, graph.actors[b].id);
            let y = solver.add_variable(0.0, 1.0, VarKind::Binary, &name)?;
            vars.order.push(((a, b), y));
        }
    }

    let mut count = 0;

    for (a, actor) in graph.actors.iter().enumerate() {
        let mapping: LinearExpr = vars.r[a].iter().map(|&r| (1.0, r)).collect();
        let name = format!("one_resource_{}", actor.id);
        solver.add_constraint(mapping, ConstraintSense::Equal, 1.0, &name)?;
        count += 1;
    }

    for &((a, b), y) in &vars.order {
        let (da, db) = (
            f64::from(graph.actors[a].duration),
            f64::from(graph.actors[b].duration),
        );
        let (ida, idb) = (&graph.actors[a].id, &graph.actors[b].id);
        for c in 0..cores {
            let (sa, sb) = (vars.start[a], vars.start[b]);
            let (rac, rbc) = (vars.r[a][c], vars.r[b][c]);

            let before: LinearExpr = [
                (1.0, sa),
                (-1.0, sb),
                (big_m, y),
                (big_m, rac),
                (big_m, rbc),
            ]
            .into_iter()
            .collect();
            let name = format!("disjunct_{ida}_before_{idb}_c{c}");
            solver.add_constraint(before, ConstraintSense::LessEqual, 3.0 * big_m - da, &name)?;

            let after: LinearExpr = [
                (1.0, sb),
                (-1.0, sa),
                (-big_m, y),
                (big_m, rac),
                (big_m, rbc),
            ]
            .into_iter()
            .collect();
            let name = format!("disjunct_{idb}_before_{ida}_c{c}");
            solver.add_constraint(after, ConstraintSense::LessEqual, 2.0 * big_m - db, &name)?;
            count += 2;
        }
    }

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
        let expr: LinearExpr = [(1.0, vars.start[v]), (-1.0, vars.start[u])]
            .into_iter()
            .collect();
        let name = format!("precedence_{}_to_{}", edge.source, edge.target);
        solver.add_constraint(
            expr,
            ConstraintSense::GreaterEqual,
            f64::from(graph.actors[u].duration),
            &name,
        )?;
        count += 1;
    }

    let objective: LinearExpr = vars.start.iter().map(|&s| (1.0, s)).collect();
    solver.set_objective(objective, ObjectiveSense::Minimize)?;

    debug!(
        starts = n,
        mappings = n * cores,
        pairs = vars.order.len(),
        constraints = count,
        "big-M model built"
    );
    Ok(vars)
}

/// Builds the schedule from rounded integer starts and `R`.
pub fn decode<S: MilpSolver>(
    graph: &DataflowGraph,
    horizon: u32,
    vars: &BigMVars,
    solver: &S,
) -> Result<Schedule> {
    let mut schedule = Schedule::new();
    for (a, actor) in graph.actors.iter().enumerate() {
        let raw = solver
            .value(vars.start[a])
            .ok_or_else(|| decode_fault(&actor.id, "start time"))?
            .round();
        if !(0.0..=f64::from(horizon - actor.duration)).contains(&raw) {
            return Err(decode_fault(&actor.id, "in-horizon start time").into());
        }
        let start = raw as u32;
        let resource =
            selected(solver, vars.mappings(a)).ok_or_else(|| decode_fault(&actor.id, "core"))?;
        schedule.insert(
            actor.id.clone(),
            ActorSlot::new(resource, start, start + actor.duration),
        );
    }
    Ok(schedule)
}
