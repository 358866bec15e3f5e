use rusqlite::Connection;
use taskdeck_core::db::migrations::latest_version;
use taskdeck_core::db::{open_db, open_db_in_memory, DbError};
use taskdeck_core::{KvError, SqliteKeyValueStore};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("taskdeck.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "kv_entries");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn open_db_reports_unusable_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "plain file").unwrap();

    let err = open_db(blocker.join("taskdeck.sqlite3")).unwrap_err();
    match err {
        DbError::CreateDir { dir, .. } => assert_eq!(dir, blocker),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn kv_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteKeyValueStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        KvError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn kv_store_rejects_connection_missing_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let err = SqliteKeyValueStore::try_new(&conn).err().unwrap();
    assert!(matches!(err, KvError::MissingRequiredTable("kv_entries")));
}

#[test]
fn kv_store_rejects_connection_missing_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE kv_entries (key TEXT PRIMARY KEY NOT NULL, value TEXT NOT NULL);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();

    let err = SqliteKeyValueStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        KvError::MissingRequiredColumn {
            table: "kv_entries",
            column: "updated_at",
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
