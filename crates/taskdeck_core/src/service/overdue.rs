//! Periodic overdue re-evaluation.
//!
//! Overdue status depends on the clock, not on mutations, so it is polled
//! on a fixed interval. The tracker remembers the last overdue set so a poll
//! can tell whether anything visible changed.

use crate::model::task::{Task, TaskId};
use crate::service::view::is_overdue;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::time::Duration;

/// Default interval between overdue polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Result of one overdue poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverduePoll {
    /// Ids of tasks overdue at poll time, in list order.
    pub overdue: Vec<TaskId>,
    /// Whether the overdue set differs from the previous poll.
    pub changed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverdueTracker {
    last: BTreeSet<TaskId>,
}

impl OverdueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes overdue status at `now` and compares with the last poll.
    pub fn poll(&mut self, tasks: &[Task], now: DateTime<Utc>) -> OverduePoll {
        let overdue: Vec<TaskId> = tasks
            .iter()
            .filter(|task| is_overdue(task, now))
            .map(|task| task.id)
            .collect();
        let current: BTreeSet<TaskId> = overdue.iter().copied().collect();
        let changed = current != self.last;
        self.last = current;
        OverduePoll { overdue, changed }
    }
}
