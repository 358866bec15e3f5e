//! Task list snapshot persistence.
//!
//! # Responsibility
//! - Serialize the whole ordered task list to the `tasks` key as JSON.
//! - Decode and validate the stored snapshot on load.
//!
//! # Invariants
//! - Saved order equals in-memory order.
//! - Decoded snapshots never contain blank text or duplicate ids; such data
//!   is reported as `InvalidData` rather than partially accepted.

use crate::model::task::{Task, TaskId};
use crate::repo::kv_store::{KeyValueStore, KvError};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the JSON task array.
pub const TASKS_KEY: &str = "tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for task snapshot reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Store(KvError),
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode task snapshot: {err}"),
            Self::Decode(err) => write!(f, "failed to decode task snapshot: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode(err) | Self::Decode(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<KvError> for RepoError {
    fn from(value: KvError) -> Self {
        Self::Store(value)
    }
}

/// Repository interface for the persisted task list.
pub trait TaskRepository {
    /// Loads the stored snapshot. `Ok(None)` means nothing was stored.
    fn load_tasks(&self) -> RepoResult<Option<Vec<Task>>>;
    /// Replaces the stored snapshot with `tasks`, in order.
    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()>;
}

/// Task repository writing JSON snapshots into a key-value store.
pub struct KvTaskRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvTaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> TaskRepository for KvTaskRepository<S> {
    fn load_tasks(&self) -> RepoResult<Option<Vec<Task>>> {
        match self.store.get_item(TASKS_KEY)? {
            Some(raw) => decode_snapshot(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn save_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        let encoded = serde_json::to_string(tasks).map_err(RepoError::Encode)?;
        self.store.set_item(TASKS_KEY, &encoded)?;
        Ok(())
    }
}

/// Decodes a stored `tasks` payload and checks list invariants.
pub fn decode_snapshot(raw: &str) -> RepoResult<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(raw).map_err(RepoError::Decode)?;

    let mut seen: HashSet<TaskId> = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        task.validate()
            .map_err(|err| RepoError::InvalidData(format!("task {}: {err}", task.id)))?;
        if !seen.insert(task.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate task id `{}`",
                task.id
            )));
        }
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::{decode_snapshot, RepoError};

    #[test]
    fn decode_accepts_browser_shaped_payload() {
        let raw = r#"[
            {"id": 1718000000000, "text": "Buy milk", "completed": false,
             "priority": "high", "dueDate": "2024-06-12T18:00",
             "createdAt": "2024-06-10T08:00:00.000Z"},
            {"id": 1717000000000, "text": "Call mom", "completed": true,
             "priority": "low", "dueDate": null,
             "createdAt": "2024-06-01T08:00:00.000Z"}
        ]"#;

        let tasks = decode_snapshot(raw).expect("payload should decode");
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].due_date.is_some());
        assert!(tasks[1].due_date.is_none());
        assert!(tasks[1].completed);
    }

    #[test]
    fn decode_rejects_duplicate_ids_and_blank_text() {
        let duplicate = r#"[
            {"id": 7, "text": "a", "completed": false, "priority": "low",
             "dueDate": null, "createdAt": "2024-06-01T08:00:00Z"},
            {"id": 7, "text": "b", "completed": false, "priority": "low",
             "dueDate": null, "createdAt": "2024-06-01T08:00:00Z"}
        ]"#;
        assert!(matches!(
            decode_snapshot(duplicate),
            Err(RepoError::InvalidData(_))
        ));

        let blank = r#"[{"id": 1, "text": "  ", "completed": false, "priority": "low",
             "dueDate": null, "createdAt": "2024-06-01T08:00:00Z"}]"#;
        assert!(matches!(decode_snapshot(blank), Err(RepoError::InvalidData(_))));
    }

    #[test]
    fn decode_rejects_unknown_priority() {
        let raw = r#"[{"id": 1, "text": "x", "completed": false, "priority": "urgent",
             "dueDate": null, "createdAt": "2024-06-01T08:00:00Z"}]"#;
        assert!(matches!(decode_snapshot(raw), Err(RepoError::Decode(_))));
    }
}
