//! Decoding of solved variable values into a [`Schedule`].
//!
//! Integrality makes every one-hot family exact after an optimal solve, so
//! the selected member is the one whose value exceeds 0.5. A family with no
//! selected member means the backend returned a non-integral point, which
//! is reported as a decode fault rather than guessed around.

use crate::error::Result;
use crate::models::{ActorSlot, DataflowGraph, Schedule};
use crate::solver::{MilpSolver, SolverFault, VarId};

use super::variables::TimeIndexedVars;

/// Position of the first binary whose value rounds to 1.
pub(crate) fn selected<S: MilpSolver>(solver: &S, family: &[VarId]) -> Option<usize> {
    family
        .iter()
        .position(|&v| solver.value(v).is_some_and(|x| x > 0.5))
}

pub(crate) fn decode_fault(actor_id: &str, what: &str) -> SolverFault {
    SolverFault::new(
        SolverFault::DECODE,
        format!("no {what} selected for actor '{actor_id}' in the solver output"),
    )
}

/// Builds the schedule from `S` and `R`.
///
/// `start(a)` is the slot with `S[a,t] = 1`, `finish(a) = start(a) + d(a)`,
/// `resource(a)` is the core with `R[a,c] = 1`.
pub fn decode<S: MilpSolver>(
    graph: &DataflowGraph,
    vars: &TimeIndexedVars,
    solver: &S,
) -> Result<Schedule> {
    let mut schedule = Schedule::new();
    for (a, actor) in graph.actors.iter().enumerate() {
        let start =
            selected(solver, vars.starts(a)).ok_or_else(|| decode_fault(&actor.id, "start slot"))?;
        let resource =
            selected(solver, vars.mappings(a)).ok_or_else(|| decode_fault(&actor.id, "core"))?;
        let start = start as u32;
        schedule.insert(
            actor.id.clone(),
            ActorSlot::new(resource, start, start + actor.duration),
        );
    }
    Ok(schedule)
}
