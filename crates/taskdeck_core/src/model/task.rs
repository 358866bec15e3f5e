//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted under the `tasks` key.
//! - Provide text validation and id generation helpers used by the store.
//!
//! # Invariants
//! - `id` is stable and never reused for another task in the same session.
//! - `text` is non-empty after trimming.
//! - `created_at` is set once at creation and never changes.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Opaque task identifier.
///
/// Serialized as a bare JSON number to match the stored `tasks` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// Monotonic timestamp-based id source.
///
/// Ids follow wall-clock milliseconds but are bumped past the last issued
/// (or observed) id, so rapid successive creation never collides.
#[derive(Debug, Clone, Default)]
pub struct TaskIdGenerator {
    last: u64,
}

impl TaskIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an id that already exists so later ids are issued past it.
    pub fn observe(&mut self, id: TaskId) {
        self.last = self.last.max(id.0);
    }

    /// Issues the next id for a task created at `now`.
    ///
    /// Returns `None` once the id space is used up, i.e. an id equal to
    /// `u64::MAX` was issued or observed.
    pub fn next_id(&mut self, now: DateTime<Utc>) -> Option<TaskId> {
        let after_last = self.last.checked_add(1)?;
        let from_clock = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let next = from_clock.max(after_last);
        self.last = next;
        Some(TaskId(next))
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Severity rank used by priority sorting: high(1) < medium(2) < low(3).
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = PriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(PriorityParseError(other.to_string())),
        }
    }
}

/// Unknown priority label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityParseError(pub String);

impl Display for PriorityParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported priority `{}`; expected high|medium|low",
            self.0
        )
    }
}

impl Error for PriorityParseError {}

/// Validation errors for task content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty or whitespace only.
    EmptyText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Trimmed user text. Display sanitizing happens at render time only.
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    /// Optional deadline. `None` means no deadline.
    #[serde(default, with = "due_date_serde")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates an incomplete task after validating `text`.
    ///
    /// # Errors
    /// - `TaskValidationError::EmptyText` when `text` is blank.
    pub fn new(
        id: TaskId,
        text: &str,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        Ok(Self {
            id,
            text: normalize_text(text)?,
            completed: false,
            priority,
            due_date,
            created_at,
        })
    }

    /// Checks invariants of a task that did not come through `Task::new`,
    /// e.g. one decoded from storage.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }
}

/// Trims task text and rejects blank input.
pub fn normalize_text(text: &str) -> Result<String, TaskValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

/// Due date input that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueDateParseError(pub String);

impl Display for DueDateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid due date `{}`; expected RFC 3339 or YYYY-MM-DD[THH:MM[:SS]]",
            self.0
        )
    }
}

impl Error for DueDateParseError {}

const LOCAL_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a due date.
///
/// Accepts RFC 3339 timestamps and zone-less `datetime-local` shapes
/// (`YYYY-MM-DDTHH:MM[:SS]`, or a bare date meaning local midnight).
/// Zone-less values are interpreted in the local time zone.
pub fn parse_due_date(value: &str) -> Result<DateTime<Utc>, DueDateParseError> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = LOCAL_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| DueDateParseError(trimmed.to_string()))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| DueDateParseError(trimmed.to_string()))
}

/// Formats a due date the way it is written to storage.
pub fn format_due_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

mod due_date_serde {
    use super::{format_due_date, parse_due_date};
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(due) => serializer.serialize_some(&format_due_date(due)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_due_date(&raw).map(Some).map_err(D::Error::custom),
        }
    }
}
