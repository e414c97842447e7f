//! Error types for mapping and scheduling calls.
//!
//! Infeasible and unbounded models are not errors: they come back as a
//! [`SolveStatus`](crate::models::SolveStatus) inside an `Ok` result.

use thiserror::Error;

use crate::solver::SolverFault;
use crate::validation::ValidationError;

/// Errors raised by a scheduling call.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The input graph failed structural validation.
    #[error("Invalid graph: {}", join_messages(.0))]
    InvalidGraph(Vec<ValidationError>),

    /// Core count or horizon is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// An actor does not fit in the time horizon, so it has no start slot.
    #[error("Actor '{actor}' has duration {duration} but the horizon is only {horizon} slots")]
    InfeasibleHorizon {
        actor: String,
        duration: u32,
        horizon: u32,
    },

    /// The solver environment could not be created.
    #[error("Solver unavailable: {0}")]
    SolverUnavailable(String),

    /// The solver failed during model construction, optimization or decoding.
    #[error("Solver error (code {code}): {message}")]
    SolverError { code: i32, message: String },
}

impl From<SolverFault> for ScheduleError {
    fn from(fault: SolverFault) -> Self {
        Self::SolverError {
            code: fault.code,
            message: fault.message,
        }
    }
}

/// Result type alias for scheduling operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
