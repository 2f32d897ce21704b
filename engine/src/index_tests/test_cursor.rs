//! Dictionary-style cursors expose the current key and object.

use crate::storage::IndexError;
use crate::storage::btree::{IterationOrder, KeyRange};
use crate::storage::indexes::{Index, ObjectIndex, ThickIndex};
use crate::types::{Key, KeyType, ObjectRef};

fn words() -> Index {
    let mut index = Index::new(KeyType::String, true);
    for (oid, word) in (1..).zip(["delta", "alpha", "charlie", "bravo"]) {
        index.put(Key::from(word), ObjectRef(oid)).expect("put");
    }
    index
}

#[test]
fn test_current_before_first_step() {
    let index = words();
    let cursor = index
        .cursor(KeyRange::all(), IterationOrder::Ascending)
        .expect("cursor");
    assert!(matches!(
        cursor.current(&index),
        Err(IndexError::InvalidOperation(_))
    ));
    assert!(matches!(
        cursor.current_key(&index),
        Err(IndexError::InvalidOperation(_))
    ));
}

#[test]
fn test_keys_and_objects_in_order() {
    let index = words();
    let mut cursor = index
        .cursor(KeyRange::all(), IterationOrder::Ascending)
        .expect("cursor");
    let mut pairs = Vec::new();
    while cursor.move_next(&index).expect("move") {
        let key = cursor.current_key(&index).expect("key");
        let obj = cursor.current(&index).expect("current");
        pairs.push((key.as_str().expect("string key").to_string(), obj.oid()));
    }
    assert_eq!(
        pairs,
        vec![
            ("alpha".to_string(), 2),
            ("bravo".to_string(), 4),
            ("charlie".to_string(), 3),
            ("delta".to_string(), 1),
        ]
    );

    assert!(!cursor.move_next(&index).expect("move"));
    assert!(matches!(
        cursor.current(&index),
        Err(IndexError::InvalidOperation(_))
    ));
}

#[test]
fn test_reset_restarts_from_first() {
    let index = words();
    let mut cursor = index
        .cursor(KeyRange::inclusive("b", "d"), IterationOrder::Descending)
        .expect("cursor");
    assert!(cursor.move_next(&index).expect("move"));
    assert_eq!(
        cursor.current_key(&index).expect("key"),
        &Key::from("charlie")
    );
    cursor.reset(&index);
    assert!(cursor.move_next(&index).expect("move"));
    assert_eq!(cursor.current(&index).expect("current"), ObjectRef(3));
    assert!(cursor.move_next(&index).expect("move"));
    assert_eq!(cursor.current(&index).expect("current"), ObjectRef(4));
    assert!(!cursor.move_next(&index).expect("move"));
}

#[test]
fn test_independent_cursors() {
    let mut index = words();
    let mut early = index
        .cursor(KeyRange::all(), IterationOrder::Ascending)
        .expect("cursor");
    index.put(Key::from("echo"), ObjectRef(5)).expect("put");
    let mut late = index
        .cursor(KeyRange::all(), IterationOrder::Ascending)
        .expect("cursor");

    assert_eq!(
        early.move_next(&index),
        Err(IndexError::ConcurrentModification)
    );
    let mut count = 0;
    while late.move_next(&index).expect("move") {
        count += 1;
    }
    assert_eq!(count, 5);
}

#[test]
fn test_thick_cursor_reports_shared_key() {
    let mut index = ThickIndex::new(KeyType::String);
    for oid in 1..=3 {
        index.put(Key::from("same"), ObjectRef(oid)).expect("put");
    }
    index.put(Key::from("other"), ObjectRef(4)).expect("put");

    let mut cursor = index
        .cursor(KeyRange::all(), IterationOrder::Descending)
        .expect("cursor");
    let mut seen = Vec::new();
    while cursor.move_next(&index).expect("move") {
        let key = cursor.current_key(&index).expect("key").clone();
        seen.push((key, cursor.current(&index).expect("current").oid()));
    }
    assert_eq!(
        seen,
        vec![
            (Key::from("same"), 3),
            (Key::from("same"), 2),
            (Key::from("same"), 1),
            (Key::from("other"), 4),
        ]
    );
}
