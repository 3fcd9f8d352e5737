//! Schedule (solution) model.
//!
//! A schedule is an ordered list of time slots on the shared resource,
//! one per placed task. Slots never overlap.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};

/// A complete schedule (solution to a scheduling request).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Placed tasks, in the order the producing strategy emitted them.
    pub entries: Vec<ScheduledEntry>,
}

/// A task placed on the resource during `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    /// Placed task ID.
    pub task_id: i64,
    /// Start time.
    pub start: i64,
    /// End time (`start + duration`).
    pub end: i64,
}

impl ScheduledEntry {
    /// Creates a new entry.
    pub fn new(task_id: i64, start: i64, end: i64) -> Self {
        Self {
            task_id,
            start,
            end,
        }
    }

    /// Occupied duration (end - start).
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Whether two half-open slots share any instant.
    #[inline]
    pub fn overlaps(&self, other: &ScheduledEntry) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: ScheduledEntry) {
        self.entries.push(entry);
    }

    /// Makespan: latest end time across all entries.
    pub fn makespan(&self) -> i64 {
        self.entries.iter().map(|e| e.end).max().unwrap_or(0)
    }

    /// Finds the entry for a given task.
    pub fn entry_for_task(&self, task_id: i64) -> Option<&ScheduledEntry> {
        self.entries.iter().find(|e| e.task_id == task_id)
    }

    /// IDs of the placed tasks, in entry order.
    pub fn task_ids(&self) -> Vec<i64> {
        self.entries.iter().map(|e| e.task_id).collect()
    }

    /// Total time the resource is busy.
    pub fn busy_time(&self) -> i64 {
        self.entries.iter().map(|e| e.duration()).sum()
    }

    /// Returns the first pair of overlapping entries, if any.
    pub fn find_overlap(&self) -> Option<(&ScheduledEntry, &ScheduledEntry)> {
        let mut sorted: Vec<&ScheduledEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| (e.start, e.end));
        sorted
            .windows(2)
            .find(|w| w[0].overlaps(w[1]))
            .map(|w| (w[0], w[1]))
    }

    /// Whether entries appear in non-decreasing start order.
    pub fn is_sorted_by_start(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].start <= w[1].start)
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether no task was placed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
