//! Task Store: the single owner of the ordered task list.
//!
//! # Responsibility
//! - Provide atomic create/update/delete/reorder/sort operations.
//! - Persist the full list after every applied mutation.
//!
//! # Invariants
//! - No two tasks share an id, after any sequence of operations.
//! - Rejected operations (validation, bad permutation) leave state unchanged.
//! - A failed persistence write never rolls back the in-memory mutation;
//!   the in-memory list stays authoritative for the session.

use crate::model::task::{
    normalize_text, Priority, Task, TaskId, TaskIdGenerator, TaskValidationError,
};
use crate::repo::task_repo::{RepoError, TaskRepository};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invalid reorder request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    /// Sequence contains an id the store does not hold.
    UnknownId(TaskId),
    /// Sequence lists the same id more than once.
    DuplicateId(TaskId),
    /// Sequence omits an id the store holds.
    MissingId(TaskId),
}

impl Display for ReorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownId(id) => write!(f, "reorder references unknown task {id}"),
            Self::DuplicateId(id) => write!(f, "reorder lists task {id} more than once"),
            Self::MissingId(id) => write!(f, "reorder omits task {id}"),
        }
    }
}

impl Error for ReorderError {}

/// Rejected store operation. State is unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStoreError {
    Validation(TaskValidationError),
    InvalidOperation(ReorderError),
    /// No unused id is left above the largest stored id.
    IdsExhausted,
}

impl Display for TaskStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidOperation(err) => write!(f, "invalid operation: {err}"),
            Self::IdsExhausted => write!(f, "no task id is left to assign"),
        }
    }
}

impl Error for TaskStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidOperation(err) => Some(err),
            Self::IdsExhausted => None,
        }
    }
}

impl From<TaskValidationError> for TaskStoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ReorderError> for TaskStoreError {
    fn from(value: ReorderError) -> Self {
        Self::InvalidOperation(value)
    }
}

/// Result of an applied mutation.
///
/// `value` reflects the in-memory change, which has happened regardless of
/// `persist_error`.
#[derive(Debug)]
pub struct StoreOutcome<T> {
    pub value: T,
    /// Set when the follow-up storage write failed.
    pub persist_error: Option<RepoError>,
}

impl<T> StoreOutcome<T> {
    fn new(value: T, persist_error: Option<RepoError>) -> Self {
        Self {
            value,
            persist_error,
        }
    }

    fn unpersisted(value: T) -> Self {
        Self::new(value, None)
    }

    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// What `TaskStore::load` found in storage.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Snapshot restored with this many tasks.
    Restored(usize),
    /// Nothing stored yet.
    Empty,
    /// Stored data was unreadable or malformed; the list starts empty.
    Discarded(RepoError),
}

/// Authoritative ordered task list with persistence after each mutation.
pub struct TaskStore<R: TaskRepository> {
    repo: R,
    tasks: Vec<Task>,
    ids: TaskIdGenerator,
}

impl<R: TaskRepository> TaskStore<R> {
    /// Creates an empty store without reading storage.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            tasks: Vec::new(),
            ids: TaskIdGenerator::new(),
        }
    }

    /// Creates a store and loads the persisted snapshot.
    pub fn open(repo: R) -> (Self, LoadOutcome) {
        let mut store = Self::new(repo);
        let outcome = store.load();
        (store, outcome)
    }

    /// Replaces the in-memory list with the persisted snapshot.
    ///
    /// Never fails: absent data yields an empty list and malformed data is
    /// logged and discarded.
    pub fn load(&mut self) -> LoadOutcome {
        match self.repo.load_tasks() {
            Ok(Some(tasks)) => {
                for task in &tasks {
                    self.ids.observe(task.id);
                }
                let count = tasks.len();
                self.tasks = tasks;
                info!("event=tasks_load module=store status=ok count={count}");
                LoadOutcome::Restored(count)
            }
            Ok(None) => {
                self.tasks.clear();
                info!("event=tasks_load module=store status=ok count=0 reason=absent");
                LoadOutcome::Empty
            }
            Err(err) => {
                self.tasks.clear();
                warn!("event=tasks_load module=store status=discarded error={err}");
                LoadOutcome::Discarded(err)
            }
        }
    }

    /// Owned copy of the current list, in order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Borrowed view of the current list, in order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Adds a task at the front of the list.
    ///
    /// # Errors
    /// - `TaskStoreError::Validation` when `text` is blank.
    /// - `TaskStoreError::IdsExhausted` when a stored task already holds the
    ///   largest possible id. Nothing is inserted.
    pub fn add(
        &mut self,
        text: &str,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<StoreOutcome<Task>, TaskStoreError> {
        self.add_at(text, priority, due_date, Utc::now())
    }

    /// Same as [`TaskStore::add`] with an explicit creation time.
    pub fn add_at(
        &mut self,
        text: &str,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<StoreOutcome<Task>, TaskStoreError> {
        let text = normalize_text(text)?;
        let Some(id) = self.ids.next_id(now) else {
            error!("event=task_add module=store status=error reason=ids_exhausted");
            return Err(TaskStoreError::IdsExhausted);
        };
        let task = Task {
            id,
            text,
            completed: false,
            priority,
            due_date,
            created_at: now,
        };
        self.tasks.insert(0, task.clone());
        info!(
            "event=task_add module=store status=ok id={} priority={} has_due={}",
            id,
            priority,
            due_date.is_some()
        );
        Ok(StoreOutcome::new(task, self.persist("add")))
    }

    /// Removes a task. Returns `None` without writing when `id` is absent.
    pub fn remove(&mut self, id: TaskId) -> StoreOutcome<Option<Task>> {
        let Some(index) = self.position(id) else {
            debug!("event=task_remove module=store status=not_found id={id}");
            return StoreOutcome::unpersisted(None);
        };
        let removed = self.tasks.remove(index);
        info!("event=task_remove module=store status=ok id={id}");
        StoreOutcome::new(Some(removed), self.persist("remove"))
    }

    /// Flips completion. Returns the updated task, or `None` when absent.
    pub fn toggle_completed(&mut self, id: TaskId) -> StoreOutcome<Option<Task>> {
        let Some(index) = self.position(id) else {
            debug!("event=task_toggle module=store status=not_found id={id}");
            return StoreOutcome::unpersisted(None);
        };
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        let updated = task.clone();
        info!(
            "event=task_toggle module=store status=ok id={} completed={}",
            id, updated.completed
        );
        StoreOutcome::new(Some(updated), self.persist("toggle"))
    }

    /// Replaces task text in place.
    ///
    /// # Errors
    /// - `TaskStoreError::Validation` when `new_text` is blank, checked
    ///   before the id lookup.
    pub fn edit(
        &mut self,
        id: TaskId,
        new_text: &str,
    ) -> Result<StoreOutcome<Option<Task>>, TaskStoreError> {
        let text = normalize_text(new_text)?;
        let Some(index) = self.position(id) else {
            debug!("event=task_edit module=store status=not_found id={id}");
            return Ok(StoreOutcome::unpersisted(None));
        };
        self.tasks[index].text = text;
        let updated = self.tasks[index].clone();
        info!("event=task_edit module=store status=ok id={id}");
        Ok(StoreOutcome::new(Some(updated), self.persist("edit")))
    }

    /// Removes every completed task and returns how many were removed.
    ///
    /// Nothing is written when no task was completed.
    pub fn clear_completed(&mut self) -> StoreOutcome<usize> {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        if removed == 0 {
            return StoreOutcome::unpersisted(0);
        }
        info!("event=tasks_clear_completed module=store status=ok removed={removed}");
        StoreOutcome::new(removed, self.persist("clear_completed"))
    }

    /// Replaces the list order with `order`, a permutation of current ids.
    ///
    /// # Errors
    /// - `TaskStoreError::InvalidOperation` when `order` has an unknown,
    ///   duplicate or missing id.
    pub fn reorder(&mut self, order: &[TaskId]) -> Result<StoreOutcome<()>, TaskStoreError> {
        if let Err(err) = validate_permutation(&self.tasks, order) {
            warn!("event=tasks_reorder module=store status=rejected error={err}");
            return Err(err.into());
        }

        let mut by_id: HashMap<TaskId, Task> =
            self.tasks.drain(..).map(|task| (task.id, task)).collect();
        self.tasks = order.iter().filter_map(|id| by_id.remove(id)).collect();
        info!(
            "event=tasks_reorder module=store status=ok count={}",
            self.tasks.len()
        );
        Ok(StoreOutcome::new((), self.persist("reorder")))
    }

    /// Moves one task to `target_index` (clamped to the list end), the way a
    /// single drag-and-drop gesture does.
    ///
    /// # Errors
    /// - `TaskStoreError::InvalidOperation` when `id` is unknown.
    pub fn move_task(
        &mut self,
        id: TaskId,
        target_index: usize,
    ) -> Result<StoreOutcome<()>, TaskStoreError> {
        let from = self
            .position(id)
            .ok_or(TaskStoreError::InvalidOperation(ReorderError::UnknownId(id)))?;
        let mut order: Vec<TaskId> = self.tasks.iter().map(|task| task.id).collect();
        let moved = order.remove(from);
        order.insert(target_index.min(order.len()), moved);
        self.reorder(&order)
    }

    /// Stable sort: incomplete before completed, then by priority rank.
    pub fn sort_by_priority(&mut self) -> StoreOutcome<()> {
        self.tasks
            .sort_by_key(|task| (task.completed, task.priority.rank()));
        info!(
            "event=tasks_sort module=store status=ok count={}",
            self.tasks.len()
        );
        StoreOutcome::new((), self.persist("sort"))
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn persist(&self, operation: &'static str) -> Option<RepoError> {
        match self.repo.save_tasks(&self.tasks) {
            Ok(()) => None,
            Err(err) => {
                error!(
                    "event=tasks_persist module=store status=error op={} count={} error={}",
                    operation,
                    self.tasks.len(),
                    err
                );
                Some(err)
            }
        }
    }
}

fn validate_permutation(current: &[Task], order: &[TaskId]) -> Result<(), ReorderError> {
    let known: HashSet<TaskId> = current.iter().map(|task| task.id).collect();
    let mut seen: HashSet<TaskId> = HashSet::with_capacity(order.len());
    for id in order {
        if !known.contains(id) {
            return Err(ReorderError::UnknownId(*id));
        }
        if !seen.insert(*id) {
            return Err(ReorderError::DuplicateId(*id));
        }
    }

    match current.iter().find(|task| !seen.contains(&task.id)) {
        Some(missing) => Err(ReorderError::MissingId(missing.id)),
        None => Ok(()),
    }
}
