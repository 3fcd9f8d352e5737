//! Input validation for scheduling requests.
//!
//! Checks structural integrity of a request before any scheduling work
//! begins. Detects:
//! - Duplicate task IDs
//! - Non-positive durations
//! - Negative deadlines
//! - Negative horizon
//!
//! A task whose duration exceeds the horizon is *not* rejected here: the
//! greedy strategy drops it and the optimal strategy reports infeasibility.

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::SchedulingRequest;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending field path (e.g. `tasks[2].duration`).
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two tasks share the same ID.
    DuplicateId,
    /// A task has zero or negative duration.
    NonPositiveDuration,
    /// A task has a negative deadline.
    NegativeDeadline,
    /// The planning horizon is negative.
    NegativeHorizon,
}

impl ValidationError {
    fn new(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ScheduleError {
    fn from(e: ValidationError) -> Self {
        ScheduleError::InvalidRequest {
            field: e.field,
            message: e.message,
        }
    }
}

/// Validates a scheduling request, collecting every issue.
///
/// Checks:
/// 1. Horizon is non-negative
/// 2. No duplicate task IDs
/// 3. Every duration is positive
/// 4. Every deadline is non-negative
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(request: &SchedulingRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if request.horizon < 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NegativeHorizon,
            "horizon",
            format!("Horizon must be >= 0, got {}", request.horizon),
        ));
    }

    let mut task_ids = HashSet::new();
    for (i, task) in request.tasks.iter().enumerate() {
        if !task_ids.insert(task.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("tasks[{i}].id"),
                format!("Duplicate task ID: {}", task.id),
            ));
        }

        if task.duration <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!("tasks[{i}].duration"),
                format!("Task {} has non-positive duration {}", task.id, task.duration),
            ));
        }

        if task.deadline < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeDeadline,
                format!("tasks[{i}].deadline"),
                format!("Task {} has negative deadline {}", task.id, task.deadline),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a request, failing fast with the first issue as `InvalidRequest`.
pub fn validate_request(request: &SchedulingRequest) -> ScheduleResult<()> {
    match validate_input(request) {
        Ok(()) => Ok(()),
        Err(errors) => {
            for e in &errors {
                log::debug!("rejecting request: {}: {}", e.field, e.message);
            }
            let first = errors.into_iter().next().ok_or_else(|| {
                ScheduleError::invalid("request", "validation failed without detail")
            })?;
            Err(first.into())
        }
    }
}
