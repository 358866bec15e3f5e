//! Storage file bootstrap.
//!
//! Tasks and preferences live in one SQLite file shaped like browser local
//! storage (`kv_entries`). This module opens that file, creating its parent
//! directory on first run, and brings the schema up to date before any key
//! is read.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to get a usable storage file.
#[derive(Debug)]
pub enum DbError {
    /// The directory that should hold the storage file cannot be created.
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// A migration step failed. Its transaction was rolled back, so the
    /// file stays at the previous schema version.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer taskdeck build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { dir, source } => write!(
                f,
                "cannot create storage directory `{}`: {source}",
                dir.display()
            ),
            Self::Migration { version, source } => {
                write!(f, "storage migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "storage file uses schema {db_version}, this build reads up to {latest_supported}; \
                 upgrade taskdeck to open it"
            ),
            Self::Sqlite(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Migration { source, .. } | Self::Sqlite(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
