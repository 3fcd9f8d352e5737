//! Solver configuration, status and solution.

use serde::{Deserialize, Serialize};

use super::model::VarId;

/// Default wall-clock backstop for a single solve.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 10_000;

/// Default search effort for a single solve.
pub const DEFAULT_NODE_LIMIT: u64 = 10_000;

/// Solver budget.
///
/// The node limit bounds search effort deterministically: when it runs out
/// the solver reports its best solution so far (`Feasible`), or `Timeout`
/// if it has none. The wall-clock limit is a backstop against blocking and
/// always ends in `Timeout`, so load never changes a returned schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock limit in milliseconds. `None` = unlimited.
    pub time_limit_ms: Option<u64>,
    /// Maximum number of search nodes. `None` = unlimited.
    /// Defaults to [`DEFAULT_NODE_LIMIT`].
    pub node_limit: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: Some(DEFAULT_TIME_LIMIT_MS),
            node_limit: Some(DEFAULT_NODE_LIMIT),
        }
    }
}

impl SolverConfig {
    /// Sets the wall-clock limit.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Removes every limit.
    pub fn unlimited() -> Self {
        Self {
            time_limit_ms: None,
            node_limit: None,
        }
    }
}

/// Verdict of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    /// Solution found and proven optimal.
    Optimal,
    /// Solution found, optimality not proven (node limit reached).
    Feasible,
    /// Proven to have no solution.
    Infeasible,
    /// Wall-clock limit reached, or node limit reached without a solution.
    Timeout,
    /// The model was malformed or the solver failed.
    Error,
}

impl SolverStatus {
    /// Whether the status carries a usable assignment.
    pub fn has_solution(&self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

/// Result of a solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpSolution {
    /// Verdict.
    pub status: SolverStatus,
    /// Value per model variable. Empty unless a solution was found.
    pub values: Vec<i64>,
    /// Objective value of `values`, if the model has an objective.
    pub objective: Option<i64>,
    /// Search nodes explored.
    pub nodes: u64,
    /// Wall-clock time spent (ms).
    pub elapsed_ms: u64,
    /// Diagnostic message for `Error`.
    pub message: Option<String>,
}

impl CpSolution {
    /// A solution without values carrying only a status.
    pub fn with_status(status: SolverStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: None,
            nodes: 0,
            elapsed_ms: 0,
            message: None,
        }
    }

    /// An `Error` solution with a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::with_status(SolverStatus::Error)
        }
    }

    /// Whether a usable assignment was found.
    pub fn is_solution_found(&self) -> bool {
        self.status.has_solution()
    }

    /// Value of a variable in the found solution.
    pub fn value(&self, var: VarId) -> Option<i64> {
        if self.is_solution_found() {
            self.values.get(var.index()).copied()
        } else {
            None
        }
    }
}
