//! CRUD integration tests.

mod common;

use std::collections::HashSet;

use stashdb::{CrudBackend, Entry, Error, ScannableBackend};

#[test]
fn test_round_trip() {
    let backend = common::backend();
    let entry = Entry::new("user:1", b"Alice".to_vec());

    backend.insert(&[entry.clone()]).expect("failed to insert");
    assert_eq!(backend.get(&[entry.id()]).expect("failed to get"), Some(vec![entry]));
}

#[test]
fn test_concrete_scenario() {
    let backend = common::backend();
    backend
        .insert(&[
            Entry::new("1", b"p1".to_vec()),
            Entry::new("2", b"p2".to_vec()),
            Entry::new("3", b"p3".to_vec()),
        ])
        .expect("failed to insert");

    let found = backend.get(&["2", "3"]).expect("failed to get").expect("both present");
    let payloads: Vec<&[u8]> = found.iter().map(Entry::data).collect();
    assert_eq!(payloads, vec![b"p2".as_slice(), b"p3".as_slice()]);

    assert_eq!(backend.get(&["2", "9"]).expect("failed to get"), None);
    assert_eq!(backend.exists(&["1", "9"]).expect("failed to check"), vec![true, false]);

    let ids: HashSet<String> = backend
        .all_entry_ids()
        .expect("failed to scan")
        .map(|id| id.expect("failed to read id").into_string())
        .collect();
    assert_eq!(ids, HashSet::from(["1".to_owned(), "2".to_owned(), "3".to_owned()]));
}

#[test]
fn test_get_preserves_request_order() {
    let backend = common::backend();
    backend.insert(&common::entries("k", 5)).expect("failed to insert");

    let found = backend.get(&["k4", "k0", "k2", "k0"]).expect("failed to get").expect("present");
    let ids: Vec<&str> = found.iter().map(|e| e.id().as_str()).collect();
    assert_eq!(ids, vec!["k4", "k0", "k2", "k0"]);
}

#[test]
fn test_get_empty_request() {
    let backend = common::backend();
    let none: [&str; 0] = [];
    assert_eq!(backend.get(&none).expect("failed to get"), Some(Vec::new()));
    assert!(backend.exists(&none).expect("failed to check").is_empty());
}

#[test]
fn test_uniqueness() {
    let backend = common::backend();
    let first = Entry::new("dup", b"first".to_vec());
    backend.insert(&[first.clone()]).expect("failed to insert");

    let err = backend.insert(&[Entry::new("dup", b"second".to_vec())]).expect_err("duplicate");
    assert!(err.is_duplicate_key());
    assert!(matches!(err, Error::DuplicateKey(ref id) if id.as_str() == "dup"));

    assert_eq!(backend.get(&["dup"]).expect("failed to get"), Some(vec![first]));
}

#[test]
fn test_duplicate_stops_batch_outside_transaction() {
    let backend = common::backend();
    backend.insert(&[Entry::new("b", vec![0])]).expect("failed to insert");

    let err = backend
        .insert(&[Entry::new("a", vec![1]), Entry::new("b", vec![2]), Entry::new("c", vec![3])])
        .expect_err("duplicate");
    assert!(err.is_duplicate_key());

    // Entries before the duplicate are committed, entries after it are never written.
    assert_eq!(backend.exists(&["a", "b", "c"]).expect("failed to check"), vec![true, true, false]);
    let b = backend.get(&["b"]).expect("failed to get").expect("present");
    assert_eq!(b[0].data(), &[0]);
}

#[test]
fn test_overwrite() {
    let backend = common::backend();
    let entry = Entry::new("doc", b"v1".to_vec());
    backend.insert(&[entry.clone()]).expect("failed to insert");

    backend.insert(&[entry.revise(b"v2".to_vec())]).expect("failed to overwrite");
    let stored = backend.get(&["doc"]).expect("failed to get").expect("present");
    assert_eq!(stored[0].data(), b"v2");

    // Overwriting an absent id simply stores it.
    backend.insert(&[Entry::new("fresh", b"v".to_vec()).with_prev(true)]).expect("failed to insert");
    assert_eq!(backend.exists(&["fresh"]).expect("failed to check"), vec![true]);
}

#[test]
fn test_delete() {
    let backend = common::backend();
    let entries = common::entries("d", 3);
    backend.insert(&entries).expect("failed to insert");

    backend.delete(&["d0"]).expect("failed to delete by id");
    backend.delete(&[entries[1].clone()]).expect("failed to delete by entry");
    backend.delete(&[String::from("nope")]).expect("missing id is a no-op");

    assert_eq!(backend.get(&["d0"]).expect("failed to get"), None);
    assert_eq!(backend.exists(&["d0", "d1", "d2"]).expect("failed to check"), vec![false, false, true]);
}

#[test]
fn test_clear() {
    let backend = common::backend();
    backend.insert(&common::entries("c", 42)).expect("failed to insert");

    assert_eq!(backend.clear().expect("failed to clear"), 42);
    assert_eq!(backend.all_entry_ids().expect("failed to scan").count(), 0);
    assert_eq!(backend.clear().expect("failed to clear"), 0);

    // The table is usable after clearing.
    backend.insert(&common::entries("c", 1)).expect("failed to insert");
    assert_eq!(backend.exists(&["c0"]).expect("failed to check"), vec![true]);
}

#[test]
fn test_reinsert_after_delete() {
    let backend = common::backend();
    let entry = Entry::new("x", vec![1]);
    backend.insert(&[entry.clone()]).expect("failed to insert");
    backend.delete(&[&entry]).expect("failed to delete");

    // A deleted id is free again for a new entry.
    backend.insert(&[entry]).expect("failed to reinsert");
}
