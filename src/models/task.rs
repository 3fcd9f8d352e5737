//! Task model.
//!
//! A task is a single block of work that occupies the shared resource
//! for a fixed duration and should finish by its deadline.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use serde::{Deserialize, Serialize};

/// A task to be placed on the shared resource.
///
/// # Time Representation
/// All times are integer units relative to the planning epoch (t=0).
/// The consumer defines what one unit means (minutes, slots, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier, unique within a request.
    pub id: i64,
    /// Human-readable name. Informational only, but required on the wire.
    pub name: String,
    /// Scheduling priority (higher = more important).
    pub priority: i32,
    /// Time units the task occupies the resource. Must be positive.
    pub duration: i64,
    /// Latest acceptable completion time.
    pub deadline: i64,
}

impl Task {
    /// Creates a task with the given ID, duration and deadline.
    pub fn new(id: i64, duration: i64, deadline: i64) -> Self {
        Self {
            id,
            name: String::new(),
            priority: 0,
            duration,
            deadline,
        }
    }

    /// Sets the task name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the scheduling priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Deadline clipped to the planning horizon.
    #[inline]
    pub fn effective_deadline(&self, horizon: i64) -> i64 {
        self.deadline.min(horizon)
    }

    /// Lateness if the task finishes at `end` (0 when on time).
    #[inline]
    pub fn tardiness_at(&self, end: i64) -> i64 {
        (end - self.deadline).max(0)
    }
}
