//! View Projector: read-only filtered projections of the task list.
//!
//! # Responsibility
//! - Select the tasks shown for a display filter, in store order.
//! - Compute summary counts and the time-dependent overdue predicate.
//! - Produce display rows with render-safe text.
//!
//! # Invariants
//! - Projections never reorder beyond the store order.
//! - Projections return owned copies; the store list is never mutated here.
//! - Overdue status is recomputed from `now` on every call, never cached.

use crate::model::task::Task;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static CONTROL_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Cc}\p{Cf}]+").expect("valid control char regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Named view predicate applied for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Returns whether `task` belongs to this filter.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(FilterParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParseError(pub String);

impl Display for FilterParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported filter `{}`; expected all|active|completed",
            self.0
        )
    }
}

impl Error for FilterParseError {}

/// Summary counts for one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// One display row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub task: Task,
    pub overdue: bool,
    /// Task text with control characters removed and whitespace collapsed.
    pub display_text: String,
}

/// Returns the tasks matching `filter`, in store order.
pub fn project(filter: Filter, tasks: &[Task]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect()
}

/// Counts total, active and completed tasks in one pass.
pub fn counts(tasks: &[Task]) -> TaskCounts {
    tasks.iter().fold(TaskCounts::default(), |mut acc, task| {
        acc.total += 1;
        if task.completed {
            acc.completed += 1;
        } else {
            acc.active += 1;
        }
        acc
    })
}

/// A task is overdue iff it has a due date, is not completed, and the due
/// date is strictly before `now`.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < now)
}

/// Builds display rows for `filter`, evaluating overdue status at `now`.
pub fn rows(filter: Filter, tasks: &[Task], now: DateTime<Utc>) -> Vec<TaskRow> {
    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .map(|task| TaskRow {
            overdue: is_overdue(task, now),
            display_text: display_text(&task.text),
            task: task.clone(),
        })
        .collect()
}

/// Makes stored text safe to show on a single line.
///
/// The stored text is left untouched; this only shapes what is rendered.
pub fn display_text(text: &str) -> String {
    let without_controls = CONTROL_CHARS_RE.replace_all(text, " ");
    WHITESPACE_RE
        .replace_all(&without_controls, " ")
        .trim()
        .to_string()
}
