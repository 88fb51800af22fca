use emdr_core::db::migrations::latest_version;
use emdr_core::db::{open_db, open_db_in_memory, DbError};
use emdr_core::{
    FixedClock, KeyValueStore, LoadOutcome, ManualScheduler, NoteDraft, SqliteStore, StateStore,
    StorageError,
};
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_entries");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emdr.db");

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
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match SqliteStore::open(&path) {
        Err(StorageError::Db(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        })) => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer schema must be rejected"),
    }
}

#[test]
fn set_overwrites_and_remove_deletes() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.get("emdr-app-state").unwrap(), None);

    store.set("emdr-app-state", "{}").unwrap();
    store.set("emdr-app-state", r#"{"gap":20}"#).unwrap();
    store.set("emdr-notes", "[]").unwrap();
    assert_eq!(
        store.get("emdr-app-state").unwrap().as_deref(),
        Some(r#"{"gap":20}"#)
    );
    assert_eq!(
        store.keys().unwrap(),
        vec!["emdr-app-state".to_string(), "emdr-notes".to_string()]
    );

    store.remove("emdr-notes").unwrap();
    assert_eq!(store.get("emdr-notes").unwrap(), None);
}

#[test]
fn state_store_survives_database_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.db");

    let note_id = {
        let mut store = StateStore::new(
            SqliteStore::open(&path).unwrap(),
            ManualScheduler::new(),
            FixedClock::new(1_709_632_800_000),
        );
        assert_eq!(store.load(), LoadOutcome::Defaults);
        store.set_gap(75);
        let id = store.add_note(NoteDraft::new("Session 1", "")).unwrap();
        assert_eq!(store.advance_time(Duration::from_millis(500)), 1);
        id
    };

    let mut reopened = StateStore::new(
        SqliteStore::open(&path).unwrap(),
        ManualScheduler::new(),
        FixedClock::new(0),
    );
    assert_eq!(reopened.load(), LoadOutcome::Restored);
    assert_eq!(reopened.settings().gap, 75);
    assert_eq!(reopened.notes()[0].id, note_id);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "expected table `{table_name}` to exist");
}
