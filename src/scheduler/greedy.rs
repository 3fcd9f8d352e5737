//! Priority-driven greedy packing.
//!
//! # Algorithm
//!
//! 1. Sort tasks by priority (descending), then deadline (ascending).
//! 2. Keep a single cursor `time = 0`.
//! 3. For each task, place it at `time` if it finishes by
//!    `min(deadline, horizon)`; otherwise drop it.
//!
//! It is not optimal: a high-priority task can push a lower-priority one
//! past its deadline even when another order would fit both.
//!
//! # Complexity
//! O(n log n) for the sort, O(n) for the packing.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use log::debug;

use crate::models::{Schedule, ScheduledEntry, SchedulingRequest, Task};

/// Greedy single-resource packer.
///
/// # Example
///
/// ```
/// use u_slotplan::models::{SchedulingRequest, Task};
/// use u_slotplan::scheduler::GreedyScheduler;
///
/// let request = SchedulingRequest::new(
///     vec![
///         Task::new(1, 3, 5).with_priority(5),
///         Task::new(2, 4, 4).with_priority(3),
///     ],
///     10,
/// );
///
/// let schedule = GreedyScheduler::new().schedule(&request);
/// assert_eq!(schedule.task_ids(), vec![1]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyScheduler;

impl GreedyScheduler {
    /// Creates a new scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Returns task indices in placement order.
    ///
    /// Priority descending, then deadline ascending. Ties beyond that keep
    /// input order (the sort is stable).
    pub fn order(&self, tasks: &[Task]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..tasks.len()).collect();
        indices.sort_by(|&a, &b| {
            tasks[b]
                .priority
                .cmp(&tasks[a].priority)
                .then(tasks[a].deadline.cmp(&tasks[b].deadline))
        });
        indices
    }

    /// Packs tasks back to back, dropping the ones that miss their bound.
    ///
    /// Entries come out in ascending start order. The result may be empty.
    pub fn schedule(&self, request: &SchedulingRequest) -> Schedule {
        let mut schedule = Schedule::new();
        let mut time: i64 = 0;

        for idx in self.order(&request.tasks) {
            let task = &request.tasks[idx];
            let bound = task.effective_deadline(request.horizon);

            // An end past i64::MAX is past every bound.
            match time.checked_add(task.duration) {
                Some(end) if end <= bound => {
                    schedule.add_entry(ScheduledEntry::new(task.id, time, end));
                    time = end;
                }
                end => {
                    debug!(
                        "task {} dropped: would end at {end:?}, bound {bound}",
                        task.id
                    );
                }
            }
        }

        debug!(
            "greedy placed {}/{} tasks, makespan {}",
            schedule.entry_count(),
            request.task_count(),
            schedule.makespan()
        );
        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_wins_over_deadline() {
        // Task 1 first (higher priority), task 2 then misses min(4, 10).
        let request = SchedulingRequest::new(
            vec![
                Task::new(1, 3, 5).with_priority(5),
                Task::new(2, 4, 4).with_priority(3),
            ],
            10,
        );

        let schedule = GreedyScheduler::new().schedule(&request);
        assert_eq!(schedule.entries, vec![ScheduledEntry::new(1, 0, 3)]);
    }

    #[test]
    fn test_horizon_drops_only_task() {
        let request = SchedulingRequest::new(vec![Task::new(1, 2, 10).with_priority(1)], 1);
        let schedule = GreedyScheduler::new().schedule(&request);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_deadline_breaks_priority_ties() {
        let tasks = vec![
            Task::new(1, 1, 9).with_priority(2),
            Task::new(2, 1, 3).with_priority(2),
            Task::new(3, 1, 1).with_priority(7),
        ];
        assert_eq!(GreedyScheduler::new().order(&tasks), vec![2, 1, 0]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let tasks = vec![Task::new(10, 1, 5), Task::new(20, 1, 5)];
        assert_eq!(GreedyScheduler::new().order(&tasks), vec![0, 1]);
    }

    #[test]
    fn test_back_to_back_packing() {
        let request = SchedulingRequest::new(
            vec![
                Task::new(1, 2, 20).with_priority(1),
                Task::new(2, 3, 20).with_priority(3),
                Task::new(3, 4, 20).with_priority(2),
            ],
            20,
        );

        let schedule = GreedyScheduler::new().schedule(&request);
        assert_eq!(
            schedule.entries,
            vec![
                ScheduledEntry::new(2, 0, 3),
                ScheduledEntry::new(3, 3, 7),
                ScheduledEntry::new(1, 7, 9),
            ]
        );
        assert!(schedule.is_sorted_by_start());
    }

    #[test]
    fn test_dropped_task_does_not_advance_cursor() {
        let request = SchedulingRequest::new(
            vec![
                Task::new(1, 5, 2).with_priority(9), // cannot fit its deadline
                Task::new(2, 2, 4).with_priority(1),
            ],
            10,
        );

        let schedule = GreedyScheduler::new().schedule(&request);
        assert_eq!(schedule.entries, vec![ScheduledEntry::new(2, 0, 2)]);
    }

    #[test]
    fn test_later_short_task_fills_remaining_room() {
        let request = SchedulingRequest::new(
            vec![
                Task::new(1, 4, 6).with_priority(3),
                Task::new(2, 4, 6).with_priority(2),
                Task::new(3, 2, 6).with_priority(1),
            ],
            6,
        );

        let schedule = GreedyScheduler::new().schedule(&request);
        assert_eq!(schedule.task_ids(), vec![1, 3]);
        assert_eq!(schedule.makespan(), 6);
    }

    #[test]
    fn test_zero_horizon() {
        let request = SchedulingRequest::new(vec![Task::new(1, 1, 5)], 0);
        assert!(GreedyScheduler::new().schedule(&request).is_empty());
    }

    #[test]
    fn test_extreme_durations_do_not_wrap() {
        let request = SchedulingRequest::new(
            vec![
                Task::new(1, 1, 5).with_priority(9),
                Task::new(2, i64::MAX, i64::MAX),
            ],
            i64::MAX,
        );

        let schedule = GreedyScheduler::new().schedule(&request);
        assert_eq!(schedule.entries, vec![ScheduledEntry::new(1, 0, 1)]);
    }

    #[test]
    fn test_max_duration_fits_alone() {
        let request = SchedulingRequest::new(vec![Task::new(1, i64::MAX, i64::MAX)], i64::MAX);
        let schedule = GreedyScheduler::new().schedule(&request);
        assert_eq!(schedule.entries, vec![ScheduledEntry::new(1, 0, i64::MAX)]);
    }

    #[test]
    fn test_empty_input() {
        let request = SchedulingRequest::new(vec![], 10);
        let schedule = GreedyScheduler::new().schedule(&request);
        assert!(schedule.is_empty());
        assert_eq!(schedule.makespan(), 0);
    }
}
