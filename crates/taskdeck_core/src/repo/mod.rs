//! Repository layer over local key-value storage.
//!
//! # Responsibility
//! - Define persistence contracts used by the task store and the board.
//! - Isolate storage details (SQLite, JSON encoding) from services.
//!
//! # Invariants
//! - Each logical record lives under its own key (`tasks`, `theme`).
//! - Repository APIs return semantic errors (`InvalidData`, `QuotaExceeded`)
//!   in addition to transport errors.

pub mod kv_store;
pub mod preferences_repo;
pub mod task_repo;
