#![cfg(feature = "memory")]

use quarry_store::{MemoryStore, Store, StoreError, Transaction};

const CF: &str = "patients";

fn mem_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.create_cf(CF).unwrap();
    store
}

#[test]
fn put_and_get() {
    let store = mem_store();
    let txn = store.begin(false).unwrap();
    let cf = txn.cf(CF).unwrap();
    txn.put(&cf, b"key1", b"value1").unwrap();
    txn.commit().unwrap();

    let txn = store.begin(true).unwrap();
    let cf = txn.cf(CF).unwrap();
    assert_eq!(txn.get(&cf, b"key1").unwrap().unwrap(), b"value1");
}

#[test]
fn get_missing_key_returns_none() {
    let store = mem_store();
    let txn = store.begin(true).unwrap();
    let cf = txn.cf(CF).unwrap();
    assert!(txn.get(&cf, b"nonexistent").unwrap().is_none());
}

#[test]
fn writes_are_visible_inside_the_transaction() {
    let store = mem_store();
    let txn = store.begin(false).unwrap();
    let cf = txn.cf(CF).unwrap();
    txn.put(&cf, b"key1", b"value1").unwrap();
    assert_eq!(txn.get(&cf, b"key1").unwrap().unwrap(), b"value1");
}

#[test]
fn rollback_discards_writes() {
    let store = mem_store();
    let txn = store.begin(false).unwrap();
    let cf = txn.cf(CF).unwrap();
    txn.put(&cf, b"key1", b"value1").unwrap();
    txn.rollback();

    let txn = store.begin(true).unwrap();
    let cf = txn.cf(CF).unwrap();
    assert!(txn.get(&cf, b"key1").unwrap().is_none());
}

#[test]
fn put_overwrites_existing_value() {
    let store = mem_store();
    for value in [b"first", b"secnd"] {
        let txn = store.begin(false).unwrap();
        let cf = txn.cf(CF).unwrap();
        txn.put(&cf, b"key1", value).unwrap();
        txn.commit().unwrap();
    }

    let txn = store.begin(true).unwrap();
    let cf = txn.cf(CF).unwrap();
    assert_eq!(txn.get(&cf, b"key1").unwrap().unwrap(), b"secnd");
}

#[test]
fn scan_returns_records_in_key_order() {
    let store = mem_store();
    let txn = store.begin(false).unwrap();
    let cf = txn.cf(CF).unwrap();
    txn.put(&cf, b"b", b"two").unwrap();
    txn.put(&cf, b"a", b"one").unwrap();
    txn.commit().unwrap();

    let txn = store.begin(true).unwrap();
    let cf = txn.cf(CF).unwrap();
    let pairs: Vec<_> = txn.scan(&cf).unwrap().collect();
    assert_eq!(
        pairs,
        vec![
            (b"a".to_vec(), b"one".to_vec()),
            (b"b".to_vec(), b"two".to_vec()),
        ]
    );
}

#[test]
fn read_only_transaction_rejects_writes() {
    let store = mem_store();
    let txn = store.begin(true).unwrap();
    let cf = txn.cf(CF).unwrap();
    let err = txn.put(&cf, b"key1", b"value1").unwrap_err();
    assert!(matches!(err, StoreError::ReadOnly));
}

#[test]
fn readers_keep_their_snapshot() {
    let store = mem_store();
    let reader = store.begin(true).unwrap();
    let reader_cf = reader.cf(CF).unwrap();

    let writer = store.begin(false).unwrap();
    let cf = writer.cf(CF).unwrap();
    writer.put(&cf, b"key1", b"value1").unwrap();
    writer.commit().unwrap();

    assert!(reader.get(&reader_cf, b"key1").unwrap().is_none());
}

#[test]
fn missing_column_family_is_an_error() {
    let store = MemoryStore::new();
    let txn = store.begin(true).unwrap();
    let err = txn.cf("nope").unwrap_err();
    assert!(matches!(err, StoreError::UnknownColumnFamily(name) if name == "nope"));
    assert!(!store.has_cf("nope"));
}

#[test]
fn create_cf_is_idempotent() {
    let store = mem_store();
    let txn = store.begin(false).unwrap();
    let cf = txn.cf(CF).unwrap();
    txn.put(&cf, b"key1", b"value1").unwrap();
    txn.commit().unwrap();

    store.create_cf(CF).unwrap();

    let txn = store.begin(true).unwrap();
    let cf = txn.cf(CF).unwrap();
    assert!(txn.get(&cf, b"key1").unwrap().is_some());
}

#[test]
fn scan_sees_uncommitted_writes_of_its_own_transaction() {
    let store = mem_store();
    let txn = store.begin(false).unwrap();
    let cf = txn.cf(CF).unwrap();
    txn.put(&cf, b"key1", b"value1").unwrap();
    assert_eq!(txn.scan(&cf).unwrap().count(), 1);
}
