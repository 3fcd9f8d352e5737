//! Single-resource task slot planning.
//!
//! Places a batch of tasks (priority, duration, deadline) into
//! non-overlapping slots on one shared resource within a planning horizon.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Task`, `SchedulingRequest`, `Strategy`,
//!   `Schedule`, `ScheduledEntry`
//! - **`validation`**: Input integrity checks (duplicate IDs, durations, horizon)
//! - **`scheduler`**: Greedy packing, exact makespan minimization, result
//!   assembly, KPIs and the `TaskScheduler` entry point
//! - **`cp`**: Constraint model, solver contract and the built-in
//!   branch-and-bound engine
//! - **`api`**: JSON wire adapter for an embedding transport
//! - **`error`**: `ScheduleError` taxonomy
//!
//! # Example
//!
//! ```
//! use u_slotplan::models::{SchedulingRequest, Strategy, Task};
//!
//! let request = SchedulingRequest::new(
//!     vec![
//!         Task::new(1, 3, 5).with_priority(5),
//!         Task::new(2, 4, 4).with_priority(3),
//!     ],
//!     10,
//! );
//!
//! let greedy = u_slotplan::schedule(&request, Strategy::Greedy).unwrap();
//! assert_eq!(greedy.task_ids(), vec![1]);
//!
//! let optimal = u_slotplan::schedule(&request, Strategy::Optimal).unwrap();
//! assert_eq!(optimal.makespan(), 7);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

pub mod api;
pub mod cp;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{ErrorKind, ScheduleError, ScheduleResult};
pub use scheduler::{schedule, SchedulerConfig, TaskScheduler};
