//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the canonical task record and its value types.
//! - Own identifier generation so ids stay unique within a session.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` that is never reused.
//! - Stored task text is never blank.

pub mod task;
pub mod theme;
