//! Core use-case services.
//!
//! # Responsibility
//! - Own the task list (`task_store`) and derive read-only views (`view`).
//! - Orchestrate UI flows against a presenter collaborator (`board`).
//! - Keep UI layers decoupled from storage details.

pub mod board;
pub mod overdue;
pub mod task_store;
pub mod view;
