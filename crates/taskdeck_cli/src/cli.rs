//! Command-line surface.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use taskdeck_core::{parse_due_date, ConfigOverrides, Filter, Priority, TaskId};

#[derive(Debug, Parser)]
#[command(name = "taskdeck")]
#[command(about = "Local task list with priorities, due dates and manual ordering")]
#[command(version)]
pub struct Cli {
    /// Storage file (defaults to TASKDECK_DB_PATH, then the local data dir)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Absolute directory for log files; logging is off when unset
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let poll_interval = match &self.command {
            Command::Watch {
                interval_secs: Some(secs),
                ..
            } => Some(Duration::from_secs((*secs).max(1))),
            _ => None,
        };
        ConfigOverrides {
            db_path: self.db.clone(),
            log_dir: self.log_dir.clone(),
            log_level: self.log_level.clone(),
            poll_interval,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a task at the top of the list
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// high|medium|low
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        /// Due date: RFC 3339 or YYYY-MM-DD[THH:MM] in local time
        #[arg(short, long, value_parser = parse_due_date)]
        due: Option<DateTime<Utc>>,
    },

    /// Show tasks
    List {
        /// all|active|completed
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },

    /// Toggle completion of a task
    Done { id: TaskId },

    /// Delete a task
    Delete { id: TaskId },

    /// Replace task text (prompts when TEXT is omitted)
    Edit {
        id: TaskId,
        #[arg(num_args = 0..)]
        text: Vec<String>,
    },

    /// Delete all completed tasks
    ClearCompleted {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Sort by completion, then priority
    Sort,

    /// Replace the whole order with the given ids
    Reorder {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<TaskId>,
    },

    /// Move one task to a zero-based position
    Move { id: TaskId, index: usize },

    /// Switch between light and dark theme
    Theme,

    /// Keep the list on screen and refresh overdue markers periodically
    Watch {
        /// all|active|completed
        #[arg(short, long, default_value = "all")]
        filter: Filter,
        /// Seconds between overdue checks (defaults to TASKDECK_POLL_SECS or 60)
        #[arg(long)]
        interval_secs: Option<u64>,
        /// Stop after this many checks
        #[arg(long)]
        ticks: Option<u32>,
    },
}
