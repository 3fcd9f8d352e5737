//! CP-based makespan minimization.
//!
//! Bridges tasks to the [`cp`](crate::cp) layer: builds a `CpModel`,
//! hands it to a `CpSolver`, and decodes the verdict.
//!
//! # Formulation
//!
//! Per task: `start, end ∈ [0, horizon]`, `slack ∈ [0, horizon]`,
//! `end = start + duration`, `end <= deadline + slack`.
//! Globally: the task intervals do not overlap, `makespan >= end` for
//! every task, and the objective minimizes `makespan` (plus total slack
//! as a tie-break under [`SlackPolicy::Tiebreak`]).
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::assemble::StrategyOutcome;
use crate::cp::{CpModel, CpSolution, CpSolver, IntervalId, LinearExpr, SolverConfig, VarId};
use crate::models::{Schedule, ScheduledEntry, SchedulingRequest, Task};

/// How deadline slack enters the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlackPolicy {
    /// Minimize makespan first, then total slack (total lateness).
    #[default]
    Tiebreak,
    /// Minimize makespan only; slack is a free relaxation.
    Free,
}

/// Solver variables of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskVars {
    pub task_id: i64,
    pub start: VarId,
    pub end: VarId,
    pub slack: VarId,
    pub interval: IntervalId,
}

/// Variable handles of a built model, in input task order.
#[derive(Debug, Clone)]
pub struct Formulation {
    pub tasks: Vec<TaskVars>,
    pub makespan: VarId,
}

/// Builds a CP model from a task set.
///
/// # Example
/// ```
/// use u_slotplan::models::Task;
/// use u_slotplan::scheduler::ScheduleCpBuilder;
///
/// let tasks = vec![Task::new(1, 3, 3), Task::new(2, 3, 6)];
/// let (model, formulation) = ScheduleCpBuilder::new(&tasks, 10).build();
/// assert_eq!(model.interval_count(), 2);
/// assert_eq!(formulation.tasks.len(), 2);
/// ```
pub struct ScheduleCpBuilder<'a> {
    tasks: &'a [Task],
    horizon: i64,
    slack_policy: SlackPolicy,
}

impl<'a> ScheduleCpBuilder<'a> {
    /// Creates a new builder.
    pub fn new(tasks: &'a [Task], horizon: i64) -> Self {
        Self {
            tasks,
            horizon,
            slack_policy: SlackPolicy::default(),
        }
    }

    /// Sets the slack policy.
    pub fn with_slack_policy(mut self, policy: SlackPolicy) -> Self {
        self.slack_policy = policy;
        self
    }

    /// Builds the model.
    pub fn build(&self) -> (CpModel, Formulation) {
        let mut model = CpModel::new("slot-plan");
        let horizon = self.horizon;

        let mut task_vars = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            let start = model.new_int_var(0, horizon, format!("start_{}", task.id));
            let end = model.new_int_var(0, horizon, format!("end_{}", task.id));
            let slack = model.new_int_var(0, horizon, format!("slack_{}", task.id));

            // end <= deadline + slack
            model.add_le(end.minus(slack), task.deadline);

            // Also posts end == start + duration.
            let interval =
                model.add_interval(start, task.duration, end, format!("interval_{}", task.id));

            task_vars.push(TaskVars {
                task_id: task.id,
                start,
                end,
                slack,
                interval,
            });
        }

        model.add_no_overlap(task_vars.iter().map(|tv| tv.interval).collect());

        let makespan = model.new_int_var(0, horizon, "makespan");
        for tv in &task_vars {
            model.add_ge(makespan.minus(tv.end), 0);
        }

        model.minimize(self.objective(makespan, &task_vars));

        debug!(
            "built model: {} tasks, {} vars, {} constraints, horizon {horizon}",
            self.tasks.len(),
            model.var_count(),
            model.constraint_count()
        );

        (
            model,
            Formulation {
                tasks: task_vars,
                makespan,
            },
        )
    }

    fn objective(&self, makespan: VarId, task_vars: &[TaskVars]) -> LinearExpr {
        match self.slack_policy {
            SlackPolicy::Free => makespan.into(),
            SlackPolicy::Tiebreak => match self.tiebreak_weight() {
                Some(weight) => task_vars.iter().fold(
                    LinearExpr::new().with_term(makespan, weight),
                    |expr, tv| expr.with_term(tv.slack, 1),
                ),
                None => {
                    warn!(
                        "slack tie-break overflows for {} tasks over horizon {}; minimizing makespan only",
                        self.tasks.len(),
                        self.horizon
                    );
                    makespan.into()
                }
            },
        }
    }

    /// Makespan weight that dominates any total slack (`<= n * horizon`).
    fn tiebreak_weight(&self) -> Option<i64> {
        let n = i64::try_from(self.tasks.len()).ok()?;
        let max_slack = n.checked_mul(self.horizon)?;
        let weight = max_slack.checked_add(1)?;
        // The objective itself must fit.
        weight.checked_mul(self.horizon)?.checked_add(max_slack)?;
        Some(weight)
    }

    /// Decodes a solution into entries in input task order.
    ///
    /// Returns `None` if the solution carries no assignment.
    pub fn decode(&self, formulation: &Formulation, solution: &CpSolution) -> Option<Schedule> {
        if !solution.is_solution_found() {
            return None;
        }

        let mut schedule = Schedule::new();
        for tv in &formulation.tasks {
            let start = solution.value(tv.start)?;
            let end = solution.value(tv.end)?;
            schedule.add_entry(ScheduledEntry::new(tv.task_id, start, end));
        }
        Some(schedule)
    }
}

/// Exact scheduler delegating to a [`CpSolver`].
#[derive(Debug, Clone)]
pub struct OptimalScheduler<S: CpSolver> {
    solver: S,
    config: SolverConfig,
    slack_policy: SlackPolicy,
}

impl<S: CpSolver> OptimalScheduler<S> {
    /// Creates a scheduler around a solver.
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            config: SolverConfig::default(),
            slack_policy: SlackPolicy::default(),
        }
    }

    /// Sets the solver budget.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the slack policy.
    pub fn with_slack_policy(mut self, policy: SlackPolicy) -> Self {
        self.slack_policy = policy;
        self
    }

    /// Builds, solves and decodes.
    pub fn schedule(&self, request: &SchedulingRequest) -> StrategyOutcome {
        let builder =
            ScheduleCpBuilder::new(&request.tasks, request.horizon).with_slack_policy(self.slack_policy);
        let (model, formulation) = builder.build();
        let solution = self.solver.solve(&model, &self.config);

        debug!(
            "solver verdict {:?}, objective {:?}, {} nodes, {} ms",
            solution.status, solution.objective, solution.nodes, solution.elapsed_ms
        );

        let schedule = builder.decode(&formulation, &solution);
        StrategyOutcome::Solved {
            status: solution.status,
            schedule,
            elapsed_ms: solution.elapsed_ms,
            message: solution.message,
        }
    }
}
