//! Constraint-programming layer.
//!
//! The narrow solver contract the optimal scheduler is written against:
//! bounded integer variables, linear constraints, interval no-overlap,
//! a minimization objective and solve-with-status. Any CP or MIP engine
//! can sit behind [`CpSolver`]; [`BranchAndBoundSolver`] is the built-in one.
//!
//! # Reference
//! - Laborie et al. (2018), "IBM ILOG CP Optimizer for Scheduling"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

mod model;
mod search;
mod solution;

pub use model::{
    Constraint, CpModel, IntVar, IntervalId, IntervalVar, LinearConstraint, LinearExpr, Relation,
    VarId,
};
pub use search::BranchAndBoundSolver;
pub use solution::{
    CpSolution, SolverConfig, SolverStatus, DEFAULT_NODE_LIMIT, DEFAULT_TIME_LIMIT_MS,
};

/// A constraint solver.
///
/// Implementations must honor the model exactly, stop within the budget in
/// `config`, and report one of the [`SolverStatus`] verdicts. `Optimal` and
/// `Feasible` must carry a value for every model variable.
pub trait CpSolver: Send + Sync {
    /// Solves the model.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

impl<S: CpSolver + ?Sized> CpSolver for &S {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        (**self).solve(model, config)
    }
}
