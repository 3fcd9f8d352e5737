//! Error taxonomy for scheduling requests.
//!
//! Every failure is terminal for the request that produced it: a failing
//! request yields no schedule at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used by the scheduling entry points.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Scheduling failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Malformed input, rejected before any scheduling work.
    #[error("Invalid request: {field}: {message}")]
    InvalidRequest { field: String, message: String },

    /// No task could be placed, or the solver proved there is no solution.
    #[error("Infeasible: {0}")]
    Infeasible(String),

    /// The solver failed or was handed a malformed model.
    #[error("Solver error: {0}")]
    SolverError(String),

    /// The solver hit its wall-clock limit, or its node limit before
    /// finding any solution.
    #[error("Solver budget exhausted after {elapsed_ms} ms")]
    SolverTimeout { elapsed_ms: u64 },
}

/// Machine-readable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    Infeasible,
    SolverError,
    SolverTimeout,
}

impl ScheduleError {
    /// Creates an `InvalidRequest` error for the given field.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The machine-readable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::Infeasible(_) => ErrorKind::Infeasible,
            Self::SolverError(_) => ErrorKind::SolverError,
            Self::SolverTimeout { .. } => ErrorKind::SolverTimeout,
        }
    }
}

impl ErrorKind {
    /// Stable string form, identical to the serialized value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Infeasible => "infeasible",
            Self::SolverError => "solver_error",
            Self::SolverTimeout => "solver_timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ScheduleError::invalid("horizon", "must be >= 0").kind(),
            ErrorKind::InvalidRequest
        );
        assert_eq!(
            ScheduleError::Infeasible("none".into()).kind(),
            ErrorKind::Infeasible
        );
        assert_eq!(
            ScheduleError::SolverTimeout { elapsed_ms: 5 }.kind(),
            ErrorKind::SolverTimeout
        );
    }

    #[test]
    fn test_error_display() {
        let e = ScheduleError::invalid("tasks[1].duration", "must be positive");
        assert_eq!(
            e.to_string(),
            "Invalid request: tasks[1].duration: must be positive"
        );
    }

    #[test]
    fn test_kind_serialization_matches_as_str() {
        for kind in [
            ErrorKind::InvalidRequest,
            ErrorKind::Infeasible,
            ErrorKind::SolverError,
            ErrorKind::SolverTimeout,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
