//! Thin wire adapter.
//!
//! Translates JSON request bodies into [`SchedulingRequest`]s and results
//! back into JSON response bodies with an HTTP-style status code. Routing,
//! CORS and the server itself belong to the embedding transport.
//!
//! # Wire format
//!
//! Request: `{"tasks": [{"id", "name", "priority", "duration", "deadline"}], "max_time": n}`
//!
//! Success (200): `[{"task_id", "start_time", "end_time"}, ...]`
//!
//! Failure: `{"detail": "...", "kind": "infeasible"}` with status
//! 400 (infeasible), 422 (invalid request), 500 (solver error) or
//! 503 (solver timeout).

use log::warn;
use serde::{Deserialize, Serialize};

use crate::cp::CpSolver;
use crate::error::{ErrorKind, ScheduleError};
use crate::models::{Schedule, ScheduledEntry, SchedulingRequest, Strategy, Task};
use crate::scheduler::TaskScheduler;

/// Message returned by the health check.
pub const HEALTH_MESSAGE: &str = "Task Scheduling Optimizer API is running!";

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerInput {
    pub tasks: Vec<Task>,
    pub max_time: i64,
}

/// One placed task in a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntryDto {
    pub task_id: i64,
    pub start_time: i64,
    pub end_time: i64,
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    pub kind: ErrorKind,
}

/// Health check body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBody {
    pub message: String,
}

/// Status code and serialized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl From<SchedulerInput> for SchedulingRequest {
    fn from(input: SchedulerInput) -> Self {
        SchedulingRequest::new(input.tasks, input.max_time)
    }
}

impl From<&ScheduledEntry> for ScheduleEntryDto {
    fn from(entry: &ScheduledEntry) -> Self {
        Self {
            task_id: entry.task_id,
            start_time: entry.start,
            end_time: entry.end,
        }
    }
}

/// Converts a schedule into its response body entries.
pub fn to_dtos(schedule: &Schedule) -> Vec<ScheduleEntryDto> {
    schedule.entries.iter().map(ScheduleEntryDto::from).collect()
}

/// HTTP-style status for an error kind.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::InvalidRequest => 422,
        ErrorKind::Infeasible => 400,
        ErrorKind::SolverError => 500,
        ErrorKind::SolverTimeout => 503,
    }
}

/// Error detail as shown to clients.
fn detail_for(error: &ScheduleError) -> String {
    match error {
        ScheduleError::Infeasible(_) => "No feasible schedule found.".to_string(),
        other => other.to_string(),
    }
}

/// Builds the error response for a scheduling failure.
pub fn error_response(error: &ScheduleError) -> ApiResponse {
    let kind = error.kind();
    let body = ErrorBody {
        detail: detail_for(error),
        kind,
    };
    ApiResponse {
        status: status_for(kind),
        body: to_json(&body),
    }
}

/// Handles a `POST /schedule` body.
pub fn handle_schedule_json<S: CpSolver>(
    body: &str,
    strategy: Strategy,
    scheduler: &TaskScheduler<S>,
) -> ApiResponse {
    let input: SchedulerInput = match serde_json::from_str(body) {
        Ok(input) => input,
        Err(e) => {
            return error_response(&ScheduleError::invalid("body", e.to_string()));
        }
    };

    let request = SchedulingRequest::from(input);
    match scheduler.schedule(&request, strategy) {
        Ok(schedule) => ApiResponse {
            status: 200,
            body: to_json(&to_dtos(&schedule)),
        },
        Err(e) => error_response(&e),
    }
}

/// Handles `GET /`.
pub fn health() -> ApiResponse {
    ApiResponse {
        status: 200,
        body: to_json(&HealthBody {
            message: HEALTH_MESSAGE.to_string(),
        }),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!("response serialization failed: {e}");
        r#"{"detail":"internal serialization error","kind":"solver_error"}"#.to_string()
    })
}
