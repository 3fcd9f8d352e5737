//! Uniform post-processing of strategy results.

use log::info;

use crate::cp::SolverStatus;
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::Schedule;

/// Raw result of one scheduling strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// Greedy packing. Entries ascend by start; may be empty.
    Packed(Schedule),
    /// Solver verdict. `schedule` is decoded in input task order when the
    /// verdict carries a solution.
    Solved {
        status: SolverStatus,
        schedule: Option<Schedule>,
        elapsed_ms: u64,
        message: Option<String>,
    },
}

/// Turns a strategy outcome into the caller-facing result.
///
/// An empty schedule is `Infeasible` for either strategy. A non-empty
/// schedule is returned unchanged.
pub fn assemble(outcome: StrategyOutcome) -> ScheduleResult<Schedule> {
    match outcome {
        StrategyOutcome::Packed(schedule) => {
            if schedule.is_empty() {
                return Err(ScheduleError::Infeasible(
                    "No feasible schedule found: no task fits before its deadline".into(),
                ));
            }
            info!(
                "greedy schedule: {} tasks, makespan {}",
                schedule.entry_count(),
                schedule.makespan()
            );
            Ok(schedule)
        }
        StrategyOutcome::Solved {
            status,
            schedule,
            elapsed_ms,
            message,
        } => match (status, schedule) {
            (SolverStatus::Optimal | SolverStatus::Feasible, Some(schedule)) => {
                if schedule.is_empty() {
                    return Err(ScheduleError::Infeasible(
                        "No feasible schedule found: no tasks to place".into(),
                    ));
                }
                info!(
                    "optimal schedule ({status:?}): {} tasks, makespan {}, {elapsed_ms} ms",
                    schedule.entry_count(),
                    schedule.makespan()
                );
                Ok(schedule)
            }
            (SolverStatus::Optimal | SolverStatus::Feasible, None) => Err(
                ScheduleError::SolverError(format!("solver reported {status:?} without values")),
            ),
            (SolverStatus::Infeasible, _) => Err(ScheduleError::Infeasible(
                "No feasible schedule found: the tasks cannot fit within the horizon".into(),
            )),
            (SolverStatus::Timeout, _) => Err(ScheduleError::SolverTimeout { elapsed_ms }),
            (SolverStatus::Error, _) => Err(ScheduleError::SolverError(
                message.unwrap_or_else(|| "unknown solver failure".into()),
            )),
        },
    }
}
