//! Scheduling request model.

use serde::{Deserialize, Serialize};

use super::Task;

/// A batch of tasks to schedule once, atomically, within a horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingRequest {
    /// Tasks to schedule. Order is not semantically significant.
    pub tasks: Vec<Task>,
    /// Latest time coordinate any schedule may use.
    pub horizon: i64,
}

/// Scheduling strategy, chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Fast priority packing. Feasible, not necessarily optimal.
    #[default]
    Greedy,
    /// Exact makespan minimization through the constraint solver.
    Optimal,
}

impl SchedulingRequest {
    /// Creates a new request.
    pub fn new(tasks: Vec<Task>, horizon: i64) -> Self {
        Self { tasks, horizon }
    }

    /// Adds a task.
    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Finds a task by ID.
    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Sum of all task durations, saturating at `i64::MAX`.
    pub fn total_duration(&self) -> i64 {
        self.tasks
            .iter()
            .fold(0i64, |acc, t| acc.saturating_add(t.duration))
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Strategy {
    /// Strategy name as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Optimal => "optimal",
        }
    }
}
