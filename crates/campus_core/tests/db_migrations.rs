use campus_core::db::migrations::{current_user_version, latest_version};
use campus_core::db::{open_db, open_db_in_memory, open_location, DbError};
use campus_core::{KeyValueStore, PortalConfig, SqliteKvStore, StorageLocation};
use rusqlite::Connection;

#[test]
fn fresh_memory_database_gets_the_kv_table() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_eq!(
        column_names(&conn, "kv_entries"),
        ["key", "value", "updated_at"]
    );
}

#[test]
fn configured_file_location_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal").join("campus.db");
    let path_value = path.to_string_lossy().into_owned();
    let config = PortalConfig::from_lookup(|key| {
        (key == "CAMPUS_DB_PATH").then(|| path_value.clone())
    })
    .unwrap();
    assert_eq!(config.storage, StorageLocation::File(path.clone()));

    {
        let conn = open_location(&config.storage).unwrap();
        let store = SqliteKvStore::try_new(&conn).unwrap();
        store.set("campus.courses", "[]").unwrap();
    }

    let conn = open_location(&config.storage).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    let store = SqliteKvStore::try_new(&conn).unwrap();
    assert_eq!(store.get("campus.courses").unwrap().as_deref(), Some("[]"));
    assert_eq!(store.keys().unwrap(), ["campus.courses"]);
}

#[test]
fn file_written_by_a_newer_build_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .pragma_update(None, "user_version", 999_u32)
        .unwrap();

    let err = open_db(&path).unwrap_err();
    assert!(err.to_string().contains("999"));
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version: 999, latest_supported }
            if latest_supported == latest_version()
    ));

    let conn = Connection::open(&path).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), 999);
    assert!(column_names(&conn, "kv_entries").is_empty());
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")
        .unwrap();
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    names
}
