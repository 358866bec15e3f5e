//! Board use-case service between the task store and a UI collaborator.
//!
//! # Responsibility
//! - Drive the user-facing flows: add, delete, toggle, edit, clear, sort,
//!   reorder, filter, theme, and periodic overdue refresh.
//! - Render through the `Presenter` after each applied change and report
//!   outcomes via `notify`.
//!
//! # Invariants
//! - The board never mutates tasks directly; it only calls `TaskStore`.
//! - Persistence failures are surfaced and logged but never undo a change.
//! - Destructive bulk removal runs only after `request_confirmation`.

use crate::model::task::{Priority, Task, TaskId, TaskValidationError};
use crate::model::theme::Theme;
use crate::repo::preferences_repo::PreferencesRepository;
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::service::overdue::OverdueTracker;
use crate::service::task_store::{LoadOutcome, StoreOutcome, TaskStore, TaskStoreError};
use crate::service::view::{self, Filter, TaskCounts, TaskRow};
use chrono::{DateTime, Utc};
use log::{error, warn};

/// Feedback severity for transient notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// Everything a presenter needs to draw the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame {
    pub filter: Filter,
    pub theme: Theme,
    /// Rows for the active filter, in store order.
    pub rows: Vec<TaskRow>,
    /// Counts over the whole list, independent of the filter.
    pub counts: TaskCounts,
    /// Time the overdue flags were evaluated at.
    pub now: DateTime<Utc>,
}

/// UI collaborator called synchronously by the board.
pub trait Presenter {
    /// Draws the frame. Must reflect row order and fields faithfully.
    fn render(&mut self, frame: &RenderFrame);
    /// Shows transient feedback.
    fn notify(&mut self, message: &str, severity: Severity);
    /// Asks the user to confirm a destructive action.
    fn request_confirmation(&mut self, prompt: &str) -> bool;
    /// Asks for replacement text. `None` means the user cancelled.
    fn request_edited_text(&mut self, prompt: &str, current: &str) -> Option<String>;
    /// Applies the display theme.
    fn apply_theme(&mut self, theme: Theme);
}

/// Clock used for overdue evaluation.
pub type Clock = fn() -> DateTime<Utc>;

pub struct TaskBoard<R, Q, P>
where
    R: TaskRepository,
    Q: PreferencesRepository,
    P: Presenter,
{
    store: TaskStore<R>,
    prefs: Q,
    presenter: P,
    filter: Filter,
    theme: Theme,
    overdue: OverdueTracker,
    clock: Clock,
}

impl<R, Q, P> TaskBoard<R, Q, P>
where
    R: TaskRepository,
    Q: PreferencesRepository,
    P: Presenter,
{
    /// Loads tasks and theme from storage and applies the theme.
    ///
    /// Unreadable stored tasks are reported and the board starts empty.
    pub fn open(tasks: R, prefs: Q, mut presenter: P) -> Self {
        let (store, outcome) = TaskStore::open(tasks);
        if let LoadOutcome::Discarded(err) = &outcome {
            presenter.notify(
                &format!("Saved tasks could not be read ({err}); starting with an empty list."),
                Severity::Error,
            );
        }

        let theme = prefs.load_theme().unwrap_or_else(|err| {
            warn!("event=theme_load module=board status=fallback error={err}");
            Theme::default()
        });
        presenter.apply_theme(theme);

        Self {
            store,
            prefs,
            presenter,
            filter: Filter::default(),
            theme,
            overdue: OverdueTracker::new(),
            clock: Utc::now,
        }
    }

    /// Replaces the clock used for overdue evaluation.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &TaskStore<R> {
        &self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Renders the current filter and resyncs the overdue tracker.
    pub fn render(&mut self) {
        let now = (self.clock)();
        let frame = self.frame_at(now);
        self.presenter.render(&frame);
        self.overdue.poll(self.store.tasks(), now);
    }

    pub fn add_task(
        &mut self,
        text: &str,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
    ) -> Option<Task> {
        match self.store.add(text, priority, due_date) {
            Ok(outcome) => {
                self.report_persist(outcome.persist_error.as_ref());
                self.render();
                self.presenter
                    .notify("Task added successfully!", Severity::Success);
                Some(outcome.value)
            }
            Err(TaskStoreError::Validation(TaskValidationError::EmptyText)) => {
                self.presenter
                    .notify("Please enter a task!", Severity::Error);
                None
            }
            Err(err) => {
                self.presenter.notify(&err.to_string(), Severity::Error);
                None
            }
        }
    }

    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let outcome = self.store.remove(id);
        if outcome.value.is_none() {
            self.notify_not_found(id);
            return false;
        }
        self.report_persist(outcome.persist_error.as_ref());
        self.render();
        self.presenter.notify("Task deleted!", Severity::Info);
        true
    }

    pub fn toggle_task(&mut self, id: TaskId) -> Option<Task> {
        let outcome = self.store.toggle_completed(id);
        let Some(task) = outcome.value else {
            self.notify_not_found(id);
            return None;
        };
        self.report_persist(outcome.persist_error.as_ref());
        self.render();
        Some(task)
    }

    /// Prompts for new text. Cancelled or blank answers change nothing.
    pub fn edit_task(&mut self, id: TaskId) -> Option<Task> {
        let Some(current) = self.store.get(id).map(|task| task.text.clone()) else {
            self.notify_not_found(id);
            return None;
        };
        let answer = self
            .presenter
            .request_edited_text("Edit task:", &current)?;
        if answer.trim().is_empty() {
            return None;
        }

        match self.store.edit(id, &answer) {
            Ok(outcome) => {
                self.report_persist(outcome.persist_error.as_ref());
                self.render();
                self.presenter.notify("Task updated!", Severity::Success);
                outcome.value
            }
            Err(err) => {
                self.presenter.notify(&err.to_string(), Severity::Error);
                None
            }
        }
    }

    /// Removes completed tasks after confirmation. Returns the removed count.
    pub fn clear_completed(&mut self) -> usize {
        let completed = view::counts(self.store.tasks()).completed;
        if completed == 0 {
            self.presenter
                .notify("No completed tasks to clear!", Severity::Info);
            return 0;
        }
        let prompt = format!("Delete {completed} completed task(s)?");
        if !self.presenter.request_confirmation(&prompt) {
            return 0;
        }

        let outcome = self.store.clear_completed();
        self.report_persist(outcome.persist_error.as_ref());
        self.render();
        self.presenter.notify(
            &format!("{} task(s) cleared!", outcome.value),
            Severity::Success,
        );
        outcome.value
    }

    pub fn sort_by_priority(&mut self) {
        let outcome = self.store.sort_by_priority();
        self.report_persist(outcome.persist_error.as_ref());
        self.render();
        self.presenter
            .notify("Tasks sorted by priority!", Severity::Success);
    }

    /// Applies a full manual order. Rejected orders change nothing.
    pub fn reorder(&mut self, order: &[TaskId]) -> bool {
        let result = self.store.reorder(order);
        self.finish_reorder(result)
    }

    /// Moves one task to `target_index`, as a drag-and-drop gesture does.
    pub fn move_task(&mut self, id: TaskId, target_index: usize) -> bool {
        let result = self.store.move_task(id, target_index);
        self.finish_reorder(result)
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.render();
    }

    /// Flips and persists the theme, then applies it.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(err) = self.prefs.save_theme(self.theme) {
            error!(
                "event=theme_persist module=board status=error theme={} error={}",
                self.theme.as_str(),
                err
            );
            self.presenter
                .notify(&format!("Could not save theme: {err}"), Severity::Error);
        }
        self.presenter.apply_theme(self.theme);
        self.theme
    }

    /// Periodic overdue check. Re-renders only when the overdue set changed
    /// since the last render or tick; returns whether it rendered.
    pub fn tick(&mut self) -> bool {
        let now = (self.clock)();
        let poll = self.overdue.poll(self.store.tasks(), now);
        if !poll.changed {
            return false;
        }
        let frame = self.frame_at(now);
        self.presenter.render(&frame);
        true
    }

    fn frame_at(&self, now: DateTime<Utc>) -> RenderFrame {
        let tasks = self.store.tasks();
        RenderFrame {
            filter: self.filter,
            theme: self.theme,
            rows: view::rows(self.filter, tasks, now),
            counts: view::counts(tasks),
            now,
        }
    }

    fn finish_reorder(
        &mut self,
        result: Result<StoreOutcome<()>, TaskStoreError>,
    ) -> bool {
        match result {
            Ok(outcome) => {
                self.report_persist(outcome.persist_error.as_ref());
                self.render();
                true
            }
            Err(err) => {
                self.presenter.notify(&err.to_string(), Severity::Error);
                false
            }
        }
    }

    fn report_persist(&mut self, err: Option<&RepoError>) {
        if let Some(err) = err {
            self.presenter
                .notify(&format!("Could not save tasks: {err}"), Severity::Error);
        }
    }

    fn notify_not_found(&mut self, id: TaskId) {
        self.presenter
            .notify(&format!("Task {id} not found."), Severity::Error);
    }
}
