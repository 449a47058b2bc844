use quillnote_core::db::migrations::latest_version;
use quillnote_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{ffi, params, Connection};

const NOTE_UUID: &str = "7f2c1a8e-0d4b-4c6e-9a51-3b8e2f6d9c10";

fn insert_note(
    conn: &Connection,
    uuid: &str,
    title: &str,
    text: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO notes (uuid, title, text, created_at) VALUES (?1, ?2, ?3, 0);",
        params![uuid, title, text],
    )
}

fn insert_tag(conn: &Connection, uuid: &str, tag: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO note_tags (note_uuid, tag) VALUES (?1, ?2);",
        params![uuid, tag],
    )
}

/// Extended SQLite result code of a failed statement.
fn extended_code(err: rusqlite::Error) -> i32 {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => failure.extended_code,
        other => panic!("expected an SQLite failure, got {other}"),
    }
}

fn tag_rows(conn: &Connection, uuid: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM note_tags WHERE note_uuid = ?1;",
        [uuid],
        |row| row.get(0),
    )
    .unwrap()
}

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn fresh_database_is_at_latest_schema_with_foreign_keys_on() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(user_version(&conn), latest_version());

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn listing_index_covers_newest_first_order() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT name, \"desc\" FROM pragma_index_xinfo('idx_notes_created_at')
             WHERE key = 1 ORDER BY seqno;",
        )
        .unwrap();
    let columns: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();

    assert_eq!(
        columns,
        vec![("created_at".to_string(), 1), ("seq".to_string(), 1)]
    );
}

#[test]
fn blank_title_or_text_is_refused_by_the_schema() {
    let conn = open_db_in_memory().unwrap();

    let blank_title = insert_note(&conn, NOTE_UUID, "   ", "body").unwrap_err();
    assert_eq!(extended_code(blank_title), ffi::SQLITE_CONSTRAINT_CHECK);

    let blank_text = insert_note(&conn, NOTE_UUID, "title", "  ").unwrap_err();
    assert_eq!(extended_code(blank_text), ffi::SQLITE_CONSTRAINT_CHECK);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn only_known_uppercase_tags_are_stored() {
    let conn = open_db_in_memory().unwrap();
    insert_note(&conn, NOTE_UUID, "title", "body").unwrap();

    for tag in ["BUSINESS", "PERSONAL", "IMPORTANT"] {
        insert_tag(&conn, NOTE_UUID, tag).unwrap();
    }
    for tag in ["business", "URGENT", ""] {
        let err = insert_tag(&conn, NOTE_UUID, tag).unwrap_err();
        assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_CHECK, "tag {tag:?}");
    }

    let duplicate = insert_tag(&conn, NOTE_UUID, "BUSINESS").unwrap_err();
    assert_eq!(extended_code(duplicate), ffi::SQLITE_CONSTRAINT_PRIMARYKEY);
    assert_eq!(tag_rows(&conn, NOTE_UUID), 3);
}

#[test]
fn tag_rows_require_an_existing_note() {
    let conn = open_db_in_memory().unwrap();
    let err = insert_tag(&conn, NOTE_UUID, "PERSONAL").unwrap_err();
    assert_eq!(extended_code(err), ffi::SQLITE_CONSTRAINT_FOREIGNKEY);
}

#[test]
fn deleting_a_note_row_removes_its_tags() {
    let conn = open_db_in_memory().unwrap();
    let other = "0b7d3e55-91a2-4f0c-8c1e-5d6a7b8c9d0e";
    insert_note(&conn, NOTE_UUID, "title", "body").unwrap();
    insert_note(&conn, other, "kept", "body").unwrap();
    insert_tag(&conn, NOTE_UUID, "BUSINESS").unwrap();
    insert_tag(&conn, NOTE_UUID, "IMPORTANT").unwrap();
    insert_tag(&conn, other, "BUSINESS").unwrap();

    conn.execute("DELETE FROM notes WHERE uuid = ?1;", [NOTE_UUID])
        .unwrap();

    assert_eq!(tag_rows(&conn, NOTE_UUID), 0);
    assert_eq!(tag_rows(&conn, other), 1);
}

#[test]
fn reopening_keeps_rows_and_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quillnote.db");

    {
        let conn = open_db(&path).unwrap();
        insert_note(&conn, NOTE_UUID, "title", "body").unwrap();
        insert_tag(&conn, NOTE_UUID, "PERSONAL").unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(tag_rows(&conn, NOTE_UUID), 1);
}

#[test]
fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 999;")
        .unwrap();

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_schema_too_new");
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion { db_version: 999, latest_supported }
            if latest_supported == latest_version()
    ));
}

#[test]
fn failed_migration_names_its_version_and_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreign.db");
    // A stray `note_tags` table without `tag` breaks the last index of the batch.
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE note_tags (note_uuid TEXT);")
        .unwrap();

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_migrate_failed");
    assert!(matches!(err, DbError::Migrate { version: 1, .. }));

    let conn = Connection::open(&path).unwrap();
    assert_eq!(user_version(&conn), 0);
    let created_by_migration: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name IN ('notes', 'idx_notes_created_at');",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(created_by_migration, 0);
}

#[test]
fn unopenable_path_reports_its_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("notes.db");

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_open_failed");
    match err {
        DbError::Open { target, .. } => assert_eq!(target, path.display().to_string()),
        other => panic!("unexpected error: {other}"),
    }
}
