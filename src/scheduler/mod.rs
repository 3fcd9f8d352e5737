//! Scheduling strategies and the scheduling entry point.
//!
//! A request passes through validation, then exactly one strategy
//! (caller-selected), then the assembler:
//!
//! ```text
//! SchedulingRequest ─► validate ─► Greedy | Optimal ─► assemble ─► Schedule / ScheduleError
//! ```
//!
//! - `GreedyScheduler`: priority/deadline ordered packing. Fast, feasible,
//!   drops what does not fit.
//! - `OptimalScheduler`: exact makespan minimization through a `CpSolver`,
//!   relaxing deadlines with bounded slack.
//!
//! No state is shared between calls; a `TaskScheduler` can serve
//! concurrent requests from many threads.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod assemble;
mod greedy;
mod kpi;
mod optimal;

pub use assemble::{assemble, StrategyOutcome};
pub use greedy::GreedyScheduler;
pub use kpi::ScheduleKpi;
pub use optimal::{Formulation, OptimalScheduler, ScheduleCpBuilder, SlackPolicy, TaskVars};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cp::{BranchAndBoundSolver, CpSolver, SolverConfig};
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{Schedule, SchedulingRequest, Strategy};
use crate::validation::validate_request;

/// Scheduler settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Budget for the optimal strategy's solver.
    pub solver: SolverConfig,
    /// How slack enters the optimal objective.
    pub slack_policy: SlackPolicy,
}

impl SchedulerConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ScheduleResult<Self> {
        serde_json::from_str(json).map_err(|e| ScheduleError::invalid("config", e.to_string()))
    }

    /// Sets the solver budget.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the slack policy.
    pub fn with_slack_policy(mut self, policy: SlackPolicy) -> Self {
        self.slack_policy = policy;
        self
    }
}

/// Scheduling entry point.
///
/// # Example
///
/// ```
/// use u_slotplan::models::{SchedulingRequest, Strategy, Task};
/// use u_slotplan::scheduler::TaskScheduler;
///
/// let request = SchedulingRequest::new(vec![Task::new(1, 3, 3), Task::new(2, 3, 6)], 10);
/// let scheduler = TaskScheduler::new();
///
/// let schedule = scheduler.schedule(&request, Strategy::Optimal).unwrap();
/// assert_eq!(schedule.makespan(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskScheduler<S: CpSolver = BranchAndBoundSolver> {
    solver: S,
    config: SchedulerConfig,
}

impl TaskScheduler {
    /// Creates a scheduler with the built-in solver and default config.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: CpSolver> TaskScheduler<S> {
    /// Replaces the solver behind the optimal strategy.
    pub fn with_solver<T: CpSolver>(self, solver: T) -> TaskScheduler<T> {
        TaskScheduler {
            solver,
            config: self.config,
        }
    }

    /// Sets the config.
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current config.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Schedules a request with the chosen strategy.
    ///
    /// Invalid requests are rejected before any scheduling work. There is
    /// no fallback between strategies.
    pub fn schedule(
        &self,
        request: &SchedulingRequest,
        strategy: Strategy,
    ) -> ScheduleResult<Schedule> {
        validate_request(request)?;
        debug!(
            "scheduling {} tasks, horizon {}, strategy {}",
            request.task_count(),
            request.horizon,
            strategy.name()
        );

        let outcome = match strategy {
            Strategy::Greedy => StrategyOutcome::Packed(GreedyScheduler::new().schedule(request)),
            Strategy::Optimal => OptimalScheduler::new(&self.solver)
                .with_config(self.config.solver.clone())
                .with_slack_policy(self.config.slack_policy)
                .schedule(request),
        };

        assemble(outcome)
    }
}

/// Schedules a request with the default scheduler.
pub fn schedule(request: &SchedulingRequest, strategy: Strategy) -> ScheduleResult<Schedule> {
    TaskScheduler::new().schedule(request, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{CpModel, CpSolution, SolverStatus};
    use crate::error::ErrorKind;
    use crate::models::{ScheduledEntry, Task};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Solver double returning a fixed status and counting calls.
    #[derive(Debug, Default)]
    struct FixedSolver {
        status: Option<SolverStatus>,
        calls: AtomicUsize,
    }

    impl FixedSolver {
        fn returning(status: SolverStatus) -> Self {
            Self {
                status: Some(status),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl CpSolver for FixedSolver {
        fn solve(&self, _model: &CpModel, _config: &SolverConfig) -> CpSolution {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                Some(SolverStatus::Error) => CpSolution::error("engine crashed"),
                Some(status) => CpSolution::with_status(status),
                None => CpSolution::with_status(SolverStatus::Infeasible),
            }
        }
    }

    #[test]
    fn test_greedy_example_priority_first() {
        let request = SchedulingRequest::new(
            vec![
                Task::new(1, 3, 5).with_priority(5),
                Task::new(2, 4, 4).with_priority(3),
            ],
            10,
        );
        let schedule = schedule(&request, Strategy::Greedy).unwrap();
        assert_eq!(schedule.entries, vec![ScheduledEntry::new(1, 0, 3)]);
    }

    #[test]
    fn test_greedy_example_all_dropped() {
        let request = SchedulingRequest::new(vec![Task::new(1, 2, 10).with_priority(1)], 1);
        let err = schedule(&request, Strategy::Greedy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Infeasible);
    }

    #[test]
    fn test_optimal_example_back_to_back() {
        init_logger();
        let request = SchedulingRequest::new(vec![Task::new(1, 3, 3), Task::new(2, 3, 6)], 10);
        let schedule = schedule(&request, Strategy::Optimal).unwrap();

        assert_eq!(schedule.makespan(), 6);
        assert_eq!(schedule.entry_count(), 2);
        assert!(schedule.find_overlap().is_none());
    }

    #[test]
    fn test_empty_task_list_is_infeasible_for_both_strategies() {
        let request = SchedulingRequest::new(vec![], 10);
        for strategy in [Strategy::Greedy, Strategy::Optimal] {
            let err = schedule(&request, strategy).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Infeasible, "{strategy:?}");
        }
    }

    #[test]
    fn test_invalid_request_skips_solver() {
        let scheduler = TaskScheduler::new().with_solver(FixedSolver::default());
        let request = SchedulingRequest::new(vec![Task::new(1, 0, 3)], 10);

        let err = scheduler.schedule(&request, Strategy::Optimal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(scheduler.solver.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_solver_failures_surface() {
        let request = SchedulingRequest::new(vec![Task::new(1, 3, 3)], 10);

        let timeout = TaskScheduler::new().with_solver(FixedSolver::returning(SolverStatus::Timeout));
        let err = timeout.schedule(&request, Strategy::Optimal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SolverTimeout);

        let error = TaskScheduler::new().with_solver(FixedSolver::returning(SolverStatus::Error));
        let err = error.schedule(&request, Strategy::Optimal).unwrap_err();
        assert_eq!(err, ScheduleError::SolverError("engine crashed".into()));
        assert_eq!(error.solver.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_fallback_to_greedy() {
        // Greedy would place task 1; the optimal strategy cannot fit both.
        let request = SchedulingRequest::new(vec![Task::new(1, 3, 3), Task::new(2, 4, 9)], 5);
        assert!(schedule(&request, Strategy::Greedy).is_ok());
        let err = schedule(&request, Strategy::Optimal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Infeasible);
    }

    #[test]
    fn test_node_budget_without_solution_is_timeout() {
        let config = SchedulerConfig::default()
            .with_solver(SolverConfig::unlimited().with_node_limit(1));
        let scheduler = TaskScheduler::new().with_config(config);
        let request = SchedulingRequest::new(vec![Task::new(1, 3, 3), Task::new(2, 3, 6)], 10);

        let err = scheduler.schedule(&request, Strategy::Optimal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SolverTimeout);
    }

    #[test]
    fn test_idempotent() {
        let request = SchedulingRequest::new(
            vec![
                Task::new(1, 4, 9).with_priority(2),
                Task::new(2, 2, 3).with_priority(2),
                Task::new(3, 3, 12).with_priority(8),
                Task::new(4, 1, 2).with_priority(1),
            ],
            15,
        );
        let scheduler = TaskScheduler::new();
        for strategy in [Strategy::Greedy, Strategy::Optimal] {
            let a = scheduler.schedule(&request, strategy).unwrap();
            let b = scheduler.schedule(&request, strategy).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_large_optimal_request_is_reproducible() {
        init_logger();
        let durations = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7];
        let tasks: Vec<Task> = durations
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let i = i as i64;
                Task::new(i + 1, d, (i * 7) % 23 + d).with_priority((i % 4) as i32)
            })
            .collect();
        let request = SchedulingRequest::new(tasks, 1000);

        let scheduler = TaskScheduler::new();
        let a = scheduler.schedule(&request, Strategy::Optimal).unwrap();
        let b = scheduler.schedule(&request, Strategy::Optimal).unwrap();
        assert_eq!(a, b);

        // The node limit, not the clock, decides where the search stops.
        let patient = TaskScheduler::new().with_config(
            SchedulerConfig::default().with_solver(SolverConfig::default().with_time_limit_ms(600_000)),
        );
        assert_eq!(patient.schedule(&request, Strategy::Optimal).unwrap(), a);

        assert_eq!(a.entry_count(), durations.len());
        assert_eq!(a.makespan(), request.total_duration());
        assert!(a.find_overlap().is_none());
    }

    #[test]
    fn test_extreme_values_do_not_wrap() {
        let request = SchedulingRequest::new(
            vec![
                Task::new(1, 1, 5).with_priority(9),
                Task::new(2, i64::MAX, i64::MAX),
            ],
            i64::MAX,
        );

        let greedy = schedule(&request, Strategy::Greedy).unwrap();
        assert_eq!(greedy.entries, vec![ScheduledEntry::new(1, 0, 1)]);

        let err = schedule(&request, Strategy::Optimal).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Infeasible);
    }

    #[test]
    fn test_concurrent_requests() {
        init_logger();
        let scheduler = TaskScheduler::new();
        let requests: Vec<SchedulingRequest> = (1..=8)
            .map(|k| {
                SchedulingRequest::new(
                    (0..4).map(|i| Task::new(i, k + i, 3 * k).with_priority(i as i32)).collect(),
                    100,
                )
            })
            .collect();

        let shared = &scheduler;
        let results: Vec<Schedule> = std::thread::scope(|scope| {
            let handles: Vec<_> = requests
                .iter()
                .map(|r| scope.spawn(move || shared.schedule(r, Strategy::Optimal).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (request, schedule) in requests.iter().zip(&results) {
            assert_eq!(schedule.makespan(), request.total_duration());
        }
    }

    #[test]
    fn test_config_from_json() {
        let config =
            SchedulerConfig::from_json(r#"{"solver": {"time_limit_ms": 250}, "slack_policy": "free"}"#)
                .unwrap();
        assert_eq!(config.solver.time_limit_ms, Some(250));
        assert_eq!(config.slack_policy, SlackPolicy::Free);

        let defaults = SchedulerConfig::from_json("{}").unwrap();
        assert_eq!(defaults, SchedulerConfig::default());

        let err = SchedulerConfig::from_json("{\"slack_policy\": 3}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    /// Minimum total tardiness over every order, packed from t=0.
    fn brute_force_tardiness(tasks: &[Task]) -> i64 {
        fn permute(tasks: &[Task], used: &mut Vec<bool>, time: i64, acc: i64, best: &mut i64) {
            if used.iter().all(|&u| u) {
                *best = (*best).min(acc);
                return;
            }
            for i in 0..tasks.len() {
                if !used[i] {
                    used[i] = true;
                    let end = time + tasks[i].duration;
                    permute(tasks, used, end, acc + tasks[i].tardiness_at(end), best);
                    used[i] = false;
                }
            }
        }
        let mut best = i64::MAX;
        permute(tasks, &mut vec![false; tasks.len()], 0, 0, &mut best);
        best
    }

    #[test]
    fn test_tiebreak_matches_brute_force_on_random_instances() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(0x5107);
        let scheduler = TaskScheduler::new();

        for _ in 0..25 {
            let n = rng.random_range(1..=5);
            let tasks: Vec<Task> = (0..n)
                .map(|i| {
                    Task::new(i, rng.random_range(1..=5), rng.random_range(0..=15))
                        .with_priority(rng.random_range(0..=3))
                })
                .collect();
            let work: i64 = tasks.iter().map(|t| t.duration).sum();
            let request = SchedulingRequest::new(tasks.clone(), work + rng.random_range(0..=5));

            let schedule = scheduler.schedule(&request, Strategy::Optimal).unwrap();
            let kpi = ScheduleKpi::calculate(&schedule, &request);

            assert_eq!(schedule.makespan(), work);
            assert_eq!(kpi.total_tardiness, brute_force_tardiness(&tasks));
        }
    }

    mod properties {
        use crate::models::{Schedule, SchedulingRequest, Task};
        use crate::scheduler::{schedule, GreedyScheduler};
        use proptest::prelude::*;

        fn arb_request(max_tasks: usize) -> impl Strategy<Value = SchedulingRequest> {
            (
                prop::collection::vec((0i32..5, 1i64..6, 0i64..25), 0..=max_tasks),
                0i64..30,
            )
                .prop_map(|(specs, horizon)| {
                    let tasks = specs
                        .into_iter()
                        .enumerate()
                        .map(|(i, (p, d, dl))| Task::new(i as i64, d, dl).with_priority(p))
                        .collect();
                    SchedulingRequest::new(tasks, horizon)
                })
        }

        fn assert_well_formed(schedule: &Schedule, request: &SchedulingRequest) {
            for entry in &schedule.entries {
                let task = request.task(entry.task_id).expect("unknown task id");
                assert_eq!(entry.end, entry.start + task.duration);
                assert!(entry.start >= 0);
                assert!(entry.end <= request.horizon);
            }
            assert!(schedule.find_overlap().is_none());
        }

        proptest! {
            #[test]
            fn greedy_schedules_are_feasible(request in arb_request(8)) {
                match schedule(&request, crate::models::Strategy::Greedy) {
                    Ok(s) => {
                        assert_well_formed(&s, &request);
                        prop_assert!(s.is_sorted_by_start());
                        for entry in &s.entries {
                            let task = request.task(entry.task_id).unwrap();
                            prop_assert!(entry.end <= task.deadline);
                        }
                    }
                    Err(e) => {
                        prop_assert_eq!(e.kind(), crate::error::ErrorKind::Infeasible);
                        prop_assert!(GreedyScheduler::new().schedule(&request).is_empty());
                    }
                }
            }

            #[test]
            fn optimal_makespan_is_total_work(request in arb_request(4)) {
                let work = request.total_duration();
                match schedule(&request, crate::models::Strategy::Optimal) {
                    Ok(s) => {
                        assert_well_formed(&s, &request);
                        prop_assert!(work <= request.horizon);
                        prop_assert_eq!(s.makespan(), work);
                        let ids: Vec<i64> = request.tasks.iter().map(|t| t.id).collect();
                        prop_assert_eq!(s.task_ids(), ids);
                    }
                    Err(e) => {
                        prop_assert_eq!(e.kind(), crate::error::ErrorKind::Infeasible);
                        prop_assert!(request.tasks.is_empty() || work > request.horizon);
                    }
                }
            }
        }
    }
}
