//! Variable allocation for the time-indexed formulation.
//!
//! Three binary families per actor `a`:
//! - `X[a,c,t]`: `a` occupies core `c` during slot `t` (`C × T` variables)
//! - `S[a,t]`: `a` starts at slot `t`, for `t ∈ [0, T − d(a)]`
//! - `R[a,c]`: `a` is mapped to core `c` (`C` variables)
//!
//! The allocator is a pure function of its inputs: every call returns a
//! fresh [`TimeIndexedVars`] bound to the solver it was given.

use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::models::DataflowGraph;
use crate::solver::{MilpSolver, VarId, VarKind};

/// Variable handles of one time-indexed model.
///
/// Outer vectors are indexed by actor position in
/// [`DataflowGraph::actors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeIndexedVars {
    /// `x[a][c][t]`
    pub(crate) x: Vec<Vec<Vec<VarId>>>,
    /// `s[a][t]`, one entry per feasible start slot.
    pub(crate) s: Vec<Vec<VarId>>,
    /// `r[a][c]`
    pub(crate) r: Vec<Vec<VarId>>,
}

impl TimeIndexedVars {
    /// Occupancy variable `X[a,c,t]`.
    pub fn occupancy(&self, actor: usize, core: usize, slot: usize) -> Option<VarId> {
        self.x.get(actor)?.get(core)?.get(slot).copied()
    }

    /// Start variables `S[a,·]` of one actor, indexed by slot.
    pub fn starts(&self, actor: usize) -> &[VarId] {
        self.s.get(actor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mapping variables `R[a,·]` of one actor, indexed by core.
    pub fn mappings(&self, actor: usize) -> &[VarId] {
        self.r.get(actor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of allocated variables.
    pub fn len(&self) -> usize {
        let x: usize = self.x.iter().flatten().map(Vec::len).sum();
        let s: usize = self.s.iter().map(Vec::len).sum();
        let r: usize = self.r.iter().map(Vec::len).sum();
        x + s + r
    }

    /// Whether no variable was allocated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fails with [`ScheduleError::InfeasibleHorizon`] for the first actor whose
/// duration exceeds the horizon.
///
/// Such an actor has an empty start domain, so the model could never be
/// feasible; this check runs before any solver model is created.
pub fn check_horizon(graph: &DataflowGraph, horizon: u32) -> Result<()> {
    match graph.actors.iter().find(|a| !a.fits(horizon)) {
        Some(actor) => Err(ScheduleError::InfeasibleHorizon {
            actor: actor.id.clone(),
            duration: actor.duration,
            horizon,
        }),
        None => Ok(()),
    }
}

/// Allocates `X`, `S` and `R` for every actor.
pub fn allocate<S: MilpSolver>(
    graph: &DataflowGraph,
    cores: usize,
    horizon: u32,
    solver: &mut S,
) -> Result<TimeIndexedVars> {
    check_horizon(graph, horizon)?;

    let n = graph.actor_count();
    let mut vars = TimeIndexedVars {
        x: Vec::with_capacity(n),
        s: Vec::with_capacity(n),
        r: Vec::with_capacity(n),
    };

    for actor in &graph.actors {
        let mut per_core = Vec::with_capacity(cores);
        for c in 0..cores {
            let mut per_slot = Vec::with_capacity(horizon as usize);
            for t in 0..horizon {
                let name = format!("X_{}_c{c}_t{t}", actor.id);
                per_slot.push(solver.add_variable(0.0, 1.0, VarKind::Binary, &name)?);
            }
            per_core.push(per_slot);
        }
        vars.x.push(per_core);

        let mut starts = Vec::with_capacity(actor.start_slot_count(horizon) as usize);
        for t in 0..actor.start_slot_count(horizon) {
            let name = format!("S_{}_t{t}", actor.id);
            starts.push(solver.add_variable(0.0, 1.0, VarKind::Binary, &name)?);
        }
        vars.s.push(starts);

        let mut mapping = Vec::with_capacity(cores);
        for c in 0..cores {
            let name = format!("R_{}_c{c}", actor.id);
            mapping.push(solver.add_variable(0.0, 1.0, VarKind::Binary, &name)?);
        }
        vars.r.push(mapping);
    }

    debug!(
        occupancy = n * cores * horizon as usize,
        starts = vars.s.iter().map(Vec::len).sum::<usize>(),
        mappings = n * cores,
        "variables allocated"
    );
    Ok(vars)
}
