//! Input validation and schedule verification.
//!
//! [`validate_graph`] checks structural integrity of a dataflow graph before
//! a model is built. Detects:
//! - Duplicate actor IDs
//! - Zero-duration actors
//! - Edges referencing unknown actors
//!
//! Cyclic precedence is deliberately not an input error: the model of a
//! cyclic graph is simply infeasible and is reported as such by the solver.
//!
//! [`verify_schedule`] re-checks every mapping/scheduling invariant directly
//! on a decoded [`Schedule`], independently of the MILP that produced it.

use crate::models::{DataflowGraph, Schedule, Violation, ViolationType};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two actors share the same ID.
    DuplicateId,
    /// An actor has a zero duration.
    ZeroDuration,
    /// An edge references an actor that doesn't exist.
    UnknownActor,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a dataflow graph.
///
/// Checks:
/// 1. No duplicate actor IDs
/// 2. Every actor duration is positive
/// 3. Every edge endpoint names an existing actor
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_graph(graph: &DataflowGraph) -> ValidationResult {
    let mut errors = Vec::new();

    let mut actor_ids = HashSet::new();
    for actor in &graph.actors {
        if !actor_ids.insert(actor.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate actor ID: {}", actor.id),
            ));
        }
        if actor.duration == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroDuration,
                format!("Actor '{}' has zero duration", actor.id),
            ));
        }
    }

    for edge in &graph.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !actor_ids.contains(endpoint.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownActor,
                    format!(
                        "Edge '{}' -> '{}' references unknown actor '{}'",
                        edge.source, edge.target, endpoint
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks a schedule against the graph it was computed for.
///
/// Verifies single placement per actor, core range, duration, horizon,
/// per-core mutual exclusion, precedence, and the recorded makespan.
///
/// # Returns
/// All detected violations; empty means the schedule is feasible.
pub fn verify_schedule(
    graph: &DataflowGraph,
    cores: usize,
    horizon: u32,
    schedule: &Schedule,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for actor in &graph.actors {
        let Some(slot) = schedule.slot(&actor.id) else {
            violations.push(Violation::missing_actor(&actor.id));
            continue;
        };

        if slot.resource >= cores {
            violations.push(Violation::other(
                ViolationType::ResourceOutOfRange,
                &actor.id,
                format!(
                    "Actor '{}' is mapped to core {} but only {} cores exist",
                    actor.id, slot.resource, cores
                ),
            ));
        }
        if slot.finish < slot.start || slot.duration() != actor.duration {
            violations.push(Violation::other(
                ViolationType::DurationMismatch,
                &actor.id,
                format!(
                    "Actor '{}' occupies [{}, {}) but its duration is {}",
                    actor.id, slot.start, slot.finish, actor.duration
                ),
            ));
        }
        if slot.finish > horizon {
            violations.push(Violation::other(
                ViolationType::HorizonExceeded,
                &actor.id,
                format!(
                    "Actor '{}' finishes at {} after the horizon {}",
                    actor.id, slot.finish, horizon
                ),
            ));
        }
    }

    for id in schedule.slots.keys() {
        if graph.actor(id).is_none() {
            violations.push(Violation::unknown_actor(id));
        }
    }

    // Pairwise overlap per core. Placements are sorted by start, so the scan
    // for `a` can stop at the first later placement starting after `a` ends.
    let mut cores_in_use: Vec<usize> = schedule.slots.values().map(|s| s.resource).collect();
    cores_in_use.sort_unstable();
    cores_in_use.dedup();
    for core in cores_in_use {
        let on_core = schedule.slots_on_resource(core);
        for (i, (a_id, a)) in on_core.iter().enumerate() {
            for (b_id, b) in &on_core[i + 1..] {
                if b.start >= a.finish {
                    break;
                }
                if a.overlaps(b) {
                    violations.push(Violation::resource_conflict(
                        core,
                        format!(
                            "Actors '{a_id}' [{}, {}) and '{b_id}' [{}, {}) overlap on core {core}",
                            a.start, a.finish, b.start, b.finish
                        ),
                    ));
                }
            }
        }
    }

    for edge in &graph.edges {
        if let (Some(src), Some(dst)) = (schedule.slot(&edge.source), schedule.slot(&edge.target))
        {
            if dst.start < src.finish {
                violations.push(Violation::precedence_violation(
                    &edge.target,
                    format!(
                        "Actor '{}' starts at {} before '{}' finishes at {}",
                        edge.target, dst.start, edge.source, src.finish
                    ),
                ));
            }
        }
    }

    let latest_finish = schedule.slots.values().map(|s| s.finish).max().unwrap_or(0);
    if schedule.makespan != latest_finish {
        violations.push(Violation::other(
            ViolationType::MakespanMismatch,
            "schedule",
            format!(
                "Recorded makespan {} differs from latest finish {}",
                schedule.makespan, latest_finish
            ),
        ));
    }

    violations
}
