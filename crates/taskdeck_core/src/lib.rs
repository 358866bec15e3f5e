//! Core domain logic for taskdeck.
//! This crate is the single source of truth for task list invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigOverrides, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{
    format_due_date, parse_due_date, DueDateParseError, Priority, PriorityParseError, Task,
    TaskId, TaskIdGenerator, TaskValidationError,
};
pub use model::theme::Theme;
pub use repo::kv_store::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore};
pub use repo::preferences_repo::{KvPreferencesRepository, PreferencesRepository, THEME_KEY};
pub use repo::task_repo::{KvTaskRepository, RepoError, RepoResult, TaskRepository, TASKS_KEY};
pub use service::board::{Clock, Presenter, RenderFrame, Severity, TaskBoard};
pub use service::overdue::{OverduePoll, OverdueTracker, DEFAULT_POLL_INTERVAL};
pub use service::task_store::{
    LoadOutcome, ReorderError, StoreOutcome, TaskStore, TaskStoreError,
};
pub use service::view::{
    counts, display_text, is_overdue, project, rows, Filter, FilterParseError, TaskCounts,
    TaskRow,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
