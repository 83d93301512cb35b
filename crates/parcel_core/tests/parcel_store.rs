use parcel_core::db::{open_db, open_db_in_memory};
use parcel_core::{
    now_rfc3339, Parcel, ParcelStatus, ParcelStore, SqliteParcelStore, StoreError,
};
use rusqlite::Connection;
use std::collections::HashMap;

fn test_parcel() -> Parcel {
    Parcel {
        number: 0,
        client: 1000,
        status: ParcelStatus::Registered,
        address: "test".to_string(),
        created_at: now_rfc3339(),
    }
}

#[test]
fn add_get_delete_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let mut parcel = test_parcel();

    let id = store.add(&parcel).unwrap();
    assert_ne!(id, 0);
    parcel.number = id;

    let stored = store.get(id).unwrap();
    assert_eq!(stored, parcel);

    store.delete(id).unwrap();
    let err = store.get(id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(number) if number == id));
    assert!(err.is_not_found());
}

#[test]
fn add_ignores_caller_number_and_assigns_unique_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();

    let mut parcel = test_parcel();
    parcel.number = 424242;
    let first = store.add(&parcel).unwrap();
    let second = store.add(&parcel).unwrap();

    assert_ne!(first, 424242);
    assert_ne!(first, second);
    assert!(store.get(424242).unwrap_err().is_not_found());
}

#[test]
fn deleted_numbers_are_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();

    let first = store.add(&test_parcel()).unwrap();
    store.delete(first).unwrap();
    let second = store.add(&test_parcel()).unwrap();

    assert!(second > first, "expected {second} > {first}");
}

#[test]
fn set_address_updates_registered_parcel() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let id = store.add(&test_parcel()).unwrap();

    store.set_address(id, "new test address").unwrap();

    assert_eq!(store.get(id).unwrap().address, "new test address");
}

#[test]
fn set_address_is_silent_noop_after_parcel_left_registered() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();

    for status in [ParcelStatus::Sent, ParcelStatus::Delivered] {
        let id = store.add(&test_parcel()).unwrap();
        store.set_status(id, status).unwrap();

        store.set_address(id, "too late").unwrap();

        let stored = store.get(id).unwrap();
        assert_eq!(stored.address, "test");
        assert_eq!(stored.status, status);
    }
}

#[test]
fn set_address_on_missing_parcel_is_not_an_error() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();

    store.set_address(9999, "nowhere").unwrap();
}

#[test]
fn set_status_overwrites_unconditionally() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let id = store.add(&test_parcel()).unwrap();

    store.set_status(id, ParcelStatus::Delivered).unwrap();
    assert_eq!(store.get(id).unwrap().status, ParcelStatus::Delivered);

    store.set_status(id, ParcelStatus::Registered).unwrap();
    assert_eq!(store.get(id).unwrap().status, ParcelStatus::Registered);

    store.set_status(id, ParcelStatus::Sent).unwrap();
    assert_eq!(store.get(id).unwrap().status, ParcelStatus::Sent);
}

#[test]
fn status_is_persisted_as_literal_name() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let id = store.add(&test_parcel()).unwrap();
    store.set_status(id, ParcelStatus::Sent).unwrap();

    let raw: String = conn
        .query_row("SELECT status FROM parcel WHERE number = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(raw, "sent");
}

#[test]
fn delete_keeps_parcel_that_was_already_sent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let mut parcel = test_parcel();
    let id = store.add(&parcel).unwrap();
    store.set_status(id, ParcelStatus::Sent).unwrap();

    store.delete(id).unwrap();

    parcel.number = id;
    parcel.status = ParcelStatus::Sent;
    assert_eq!(store.get(id).unwrap(), parcel);
}

#[test]
fn delete_missing_parcel_is_not_an_error() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();

    store.delete(9999).unwrap();
}

#[test]
fn get_by_client_returns_exactly_the_client_parcels() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let client = 7_654_321;

    let mut added = HashMap::new();
    for address in ["first", "second", "third"] {
        let mut parcel = test_parcel();
        parcel.client = client;
        parcel.address = address.to_string();
        parcel.number = store.add(&parcel).unwrap();
        added.insert(parcel.number, parcel);
    }

    let mut other = test_parcel();
    other.client = client + 1;
    store.add(&other).unwrap();

    let stored = store.get_by_client(client).unwrap();
    assert_eq!(stored.len(), added.len());
    for parcel in stored {
        assert_eq!(Some(&parcel), added.get(&parcel.number));
    }
}

#[test]
fn get_by_client_returns_empty_for_unknown_client() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    store.add(&test_parcel()).unwrap();

    assert!(store.get_by_client(31337).unwrap().is_empty());
}

#[test]
fn add_rejects_malformed_created_at() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let mut parcel = test_parcel();
    parcel.created_at = "14.10.2026".to_string();

    let err = store.add(&parcel).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.get_by_client(parcel.client).unwrap().is_empty());
}

#[test]
fn storage_failures_are_propagated() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::new(&conn);
    conn.execute_batch("DROP TABLE parcel;").unwrap();

    assert!(matches!(store.add(&test_parcel()), Err(StoreError::Db(_))));
    assert!(matches!(store.get(1), Err(StoreError::Db(_))));
    assert!(matches!(store.get_by_client(1000), Err(StoreError::Db(_))));
    assert!(matches!(store.set_address(1, "x"), Err(StoreError::Db(_))));
    assert!(matches!(
        store.set_status(1, ParcelStatus::Sent),
        Err(StoreError::Db(_))
    ));
    assert!(matches!(store.delete(1), Err(StoreError::Db(_))));
}

#[test]
fn get_rejects_unknown_persisted_status() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO parcel (client, status, address, created_at)
         VALUES (1000, 'lost', 'test', '2024-01-01T00:00:00Z');",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    let err = store.get(id).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn store_works_on_externally_created_schema() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE parcel (
            number INTEGER PRIMARY KEY AUTOINCREMENT,
            client INTEGER NOT NULL,
            status TEXT NOT NULL,
            address TEXT NOT NULL,
            created_at TEXT NOT NULL
        );",
    )
    .unwrap();

    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let id = store.add(&test_parcel()).unwrap();
    assert_eq!(store.get(id).unwrap().client, 1000);
}

#[test]
fn try_new_rejects_connection_without_parcel_table() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteParcelStore::try_new(&conn);
    assert!(matches!(result, Err(StoreError::MissingRequiredTable("parcel"))));
}

#[test]
fn try_new_rejects_parcel_table_missing_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE parcel (
            number INTEGER PRIMARY KEY AUTOINCREMENT,
            client INTEGER NOT NULL,
            status TEXT NOT NULL,
            address TEXT NOT NULL
        );",
    )
    .unwrap();

    let result = SqliteParcelStore::try_new(&conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredColumn {
            table: "parcel",
            column: "created_at"
        })
    ));
}

#[test]
fn writes_are_visible_through_another_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    let writer_conn = open_db(&path).unwrap();
    let reader_conn = open_db(&path).unwrap();
    let writer = SqliteParcelStore::try_new(&writer_conn).unwrap();
    let reader = SqliteParcelStore::try_new(&reader_conn).unwrap();

    let id = writer.add(&test_parcel()).unwrap();
    writer.set_address(id, "shared").unwrap();

    assert_eq!(reader.get(id).unwrap().address, "shared");
}

#[test]
fn get_rejects_padded_persisted_status() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO parcel (client, status, address, created_at)
         VALUES (1000, ' registered', 'old', '2024-01-01T00:00:00Z');",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    let err = store.get(id).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(ref message) if message.contains(" registered")));
    assert!(matches!(
        store.get_by_client(1000),
        Err(StoreError::InvalidData(_))
    ));
}

#[test]
fn add_rejects_created_at_with_non_utc_offset() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let mut parcel = test_parcel();
    parcel.created_at = "2024-01-01T10:00:00+03:00".to_string();

    let err = store.add(&parcel).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert!(store.get_by_client(parcel.client).unwrap().is_empty());
}

#[test]
fn get_rejects_persisted_created_at_with_non_utc_offset() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO parcel (client, status, address, created_at)
         VALUES (1000, 'registered', 'test', '2024-01-01T10:00:00+03:00');",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    assert!(matches!(store.get(id), Err(StoreError::InvalidData(_))));
}
