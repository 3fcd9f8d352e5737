//! Schedule quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Total Tardiness | Sum of max(0, end - deadline) over placed tasks |
//! | Maximum Tardiness | Largest single delay |
//! | On-Time Rate | Fraction of placed tasks meeting their deadline |
//! | Utilization | Busy time / horizon |
//! | Dropped | Requested tasks with no entry |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use crate::models::{Schedule, SchedulingRequest};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    /// Latest completion time.
    pub makespan: i64,
    /// Sum of tardiness across placed tasks.
    pub total_tardiness: i64,
    /// Maximum tardiness of any placed task.
    pub max_tardiness: i64,
    /// Fraction of placed tasks completing on time (0.0..1.0).
    pub on_time_rate: f64,
    /// Busy time over the horizon (0.0..1.0). 0 for a zero horizon.
    pub utilization: f64,
    /// Number of placed tasks.
    pub scheduled_count: usize,
    /// Number of requested tasks without an entry.
    pub dropped_count: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and the request it answers.
    pub fn calculate(schedule: &Schedule, request: &SchedulingRequest) -> Self {
        let mut total_tardiness = 0;
        let mut max_tardiness = 0;
        let mut on_time = 0usize;
        let mut placed = 0usize;

        for task in &request.tasks {
            if let Some(entry) = schedule.entry_for_task(task.id) {
                placed += 1;
                let tardiness = task.tardiness_at(entry.end);
                if tardiness == 0 {
                    on_time += 1;
                } else {
                    total_tardiness += tardiness;
                    max_tardiness = max_tardiness.max(tardiness);
                }
            }
        }

        let on_time_rate = if placed > 0 {
            on_time as f64 / placed as f64
        } else {
            0.0
        };
        let utilization = if request.horizon > 0 {
            schedule.busy_time() as f64 / request.horizon as f64
        } else {
            0.0
        };

        Self {
            makespan: schedule.makespan(),
            total_tardiness,
            max_tardiness,
            on_time_rate,
            utilization,
            scheduled_count: placed,
            dropped_count: request.task_count() - placed,
        }
    }
}
