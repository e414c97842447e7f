//! Schedule (solution) model.
//!
//! A schedule maps every actor to a core and a contiguous interval of time
//! slots `[start, finish)`. It is produced by decoding an optimal MILP
//! solution and can be re-checked independently with
//! [`verify_schedule`](crate::validation::verify_schedule).
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placement of one actor: core index and half-open slot interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSlot {
    /// Core index in `[0, cores)`.
    pub resource: usize,
    /// First occupied time slot.
    pub start: u32,
    /// First slot after execution (`start + duration`).
    pub finish: u32,
}

/// A complete schedule.
///
/// Actor IDs are kept in a `BTreeMap` so iteration (and serialized output)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Actor ID → placement.
    pub slots: BTreeMap<String, ActorSlot>,
    /// Latest finish time across all actors.
    pub makespan: u32,
}

/// Terminal status of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimum found; a schedule is attached.
    Optimal,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective is unbounded.
    Unbounded,
}

/// Outcome of one scheduling call.
///
/// `objective` and `schedule` are present only when `status` is
/// [`SolveStatus::Optimal`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Terminal solver status.
    pub status: SolveStatus,
    /// Sum of actor start times. This is not the makespan.
    pub objective: Option<f64>,
    /// Decoded schedule.
    pub schedule: Option<Schedule>,
}

/// A schedule invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (actor or core).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// An actor of the graph has no placement.
    MissingActor,
    /// A placement names an actor that is not in the graph.
    UnknownActor,
    /// Core index outside `[0, cores)`.
    ResourceOutOfRange,
    /// `finish - start` differs from the actor's duration.
    DurationMismatch,
    /// The actor finishes after the horizon.
    HorizonExceeded,
    /// Two actors overlap on the same core.
    ResourceConflict,
    /// A consumer starts before its producer finishes.
    PrecedenceViolation,
    /// Recorded makespan differs from the latest finish.
    MakespanMismatch,
}

impl ActorSlot {
    /// Creates a placement.
    pub fn new(resource: usize, start: u32, finish: u32) -> Self {
        Self {
            resource,
            start,
            finish,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub fn duration(&self) -> u32 {
        self.finish.saturating_sub(self.start)
    }

    /// Whether two placements share a core and at least one slot.
    pub fn overlaps(&self, other: &ActorSlot) -> bool {
        self.resource == other.resource && self.start < other.finish && other.start < self.finish
    }
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }

    /// Creates a missing-actor violation.
    pub fn missing_actor(actor_id: impl Into<String>) -> Self {
        let id = actor_id.into();
        let message = format!("Actor '{id}' is not scheduled");
        Self::new(ViolationType::MissingActor, id, message)
    }

    /// Creates an unknown-actor violation.
    pub fn unknown_actor(actor_id: impl Into<String>) -> Self {
        let id = actor_id.into();
        let message = format!("Scheduled actor '{id}' is not in the graph");
        Self::new(ViolationType::UnknownActor, id, message)
    }

    /// Creates a resource-conflict violation.
    pub fn resource_conflict(resource: usize, message: impl Into<String>) -> Self {
        Self::new(
            ViolationType::ResourceConflict,
            format!("core{resource}"),
            message,
        )
    }

    /// Creates a precedence violation.
    pub fn precedence_violation(actor_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::PrecedenceViolation, actor_id, message)
    }

    /// Creates a violation of any other type.
    pub fn other(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(violation_type, entity_id, message)
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an actor and updates the makespan.
    pub fn insert(&mut self, actor_id: impl Into<String>, slot: ActorSlot) {
        self.makespan = self.makespan.max(slot.finish);
        self.slots.insert(actor_id.into(), slot);
    }

    /// Placement of an actor.
    pub fn slot(&self, actor_id: &str) -> Option<&ActorSlot> {
        self.slots.get(actor_id)
    }

    /// Latest finish time across all actors.
    pub fn makespan(&self) -> u32 {
        self.makespan
    }

    /// Sum of start times: the value minimized by the MILP objective.
    pub fn sum_of_starts(&self) -> u64 {
        self.slots.values().map(|s| u64::from(s.start)).sum()
    }

    /// Placements on one core, ordered by start time.
    pub fn slots_on_resource(&self, resource: usize) -> Vec<(&str, &ActorSlot)> {
        let mut on_core: Vec<(&str, &ActorSlot)> = self
            .slots
            .iter()
            .filter(|(_, s)| s.resource == resource)
            .map(|(id, s)| (id.as_str(), s))
            .collect();
        on_core.sort_by_key(|(id, s)| (s.start, *id));
        on_core
    }

    /// Number of distinct cores that execute at least one actor.
    pub fn resources_used(&self) -> usize {
        let mut cores: Vec<usize> = self.slots.values().map(|s| s.resource).collect();
        cores.sort_unstable();
        cores.dedup();
        cores.len()
    }

    /// Number of placed actors.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no actor is placed.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl OptimizationResult {
    /// Optimal outcome with its decoded schedule.
    pub fn optimal(objective: f64, schedule: Schedule) -> Self {
        Self {
            status: SolveStatus::Optimal,
            objective: Some(objective),
            schedule: Some(schedule),
        }
    }

    /// Infeasible outcome.
    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            objective: None,
            schedule: None,
        }
    }

    /// Unbounded outcome.
    pub fn unbounded() -> Self {
        Self {
            status: SolveStatus::Unbounded,
            objective: None,
            schedule: None,
        }
    }

    /// Whether an optimal schedule was found.
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Makespan of the decoded schedule, if any.
    pub fn makespan(&self) -> Option<u32> {
        self.schedule.as_ref().map(Schedule::makespan)
    }
}
