//! Actor and precedence edge model.
//!
//! An actor is the smallest schedulable unit of a dataflow graph. It runs
//! for a fixed number of time slots on exactly one core, without preemption.
//!
//! # Reference
//! Lee & Messerschmitt (1987), "Synchronous Data Flow"

use serde::{Deserialize, Serialize};

/// A computational actor with a fixed execution duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique actor identifier.
    pub id: String,
    /// Execution time in time slots. Must be positive.
    pub duration: u32,
}

/// A precedence edge: `target` may not start before `source` finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Producing actor ID.
    pub source: String,
    /// Consuming actor ID.
    pub target: String,
}

impl Actor {
    /// Creates a new actor.
    pub fn new(id: impl Into<String>, duration: u32) -> Self {
        Self {
            id: id.into(),
            duration,
        }
    }

    /// Number of feasible start slots within `horizon`.
    ///
    /// Zero when the actor cannot fit in the horizon at all.
    #[inline]
    pub fn start_slot_count(&self, horizon: u32) -> u32 {
        (horizon + 1).saturating_sub(self.duration)
    }

    /// Whether the actor fits in a horizon of `horizon` slots.
    #[inline]
    pub fn fits(&self, horizon: u32) -> bool {
        self.duration <= horizon
    }
}

impl Edge {
    /// Creates a new precedence edge.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
