//! Unique indexes refuse duplicate keys on `put` and replace on `set`.

use crate::storage::IndexError;
use crate::storage::indexes::{Index, ObjectIndex};
use crate::types::{Key, KeyType, ObjectRef};

#[test]
fn test_put_duplicate_keeps_first_mapping() {
    let mut index = Index::new(KeyType::String, true);
    assert!(index.put(Key::from("k"), ObjectRef(1)).expect("put"));
    assert!(!index.put(Key::from("k"), ObjectRef(2)).expect("put"));

    assert_eq!(index.len(), 1);
    assert_eq!(index.get(&Key::from("k")).expect("get"), Some(ObjectRef(1)));
    assert!(!index.contains(&Key::from("k"), ObjectRef(2)).expect("contains"));
}

#[test]
fn test_set_replaces_and_returns_previous() {
    let mut index = Index::new(KeyType::I32, true);
    assert_eq!(index.set(Key::from(7), ObjectRef(1)).expect("set"), None);
    assert_eq!(
        index.set(Key::from(7), ObjectRef(2)).expect("set"),
        Some(ObjectRef(1))
    );
    assert_eq!(index.len(), 1);
    assert_eq!(index.get(&Key::from(7)).expect("get"), Some(ObjectRef(2)));
}

#[test]
fn test_duplicate_index_accepts_repeats_in_insertion_order() {
    let mut index = Index::new(KeyType::I32, false);
    for oid in 1..=5 {
        assert!(index.put(Key::from(3), ObjectRef(oid)).expect("put"));
    }
    index.put(Key::from(1), ObjectRef(9)).expect("put");

    assert_eq!(
        index.to_vec().expect("scan"),
        [9, 1, 2, 3, 4, 5].map(ObjectRef).to_vec()
    );
    assert_eq!(index.get(&Key::from(3)), Err(IndexError::KeyNotUnique));
    assert_eq!(index.get(&Key::from(1)).expect("get"), Some(ObjectRef(9)));
}

#[test]
fn test_set_on_duplicate_index() {
    let mut index = Index::new(KeyType::I32, false);
    index.put(Key::from(1), ObjectRef(1)).expect("put");
    assert_eq!(
        index.set(Key::from(1), ObjectRef(2)).expect("set"),
        Some(ObjectRef(1))
    );

    index.put(Key::from(1), ObjectRef(3)).expect("put");
    assert_eq!(
        index.set(Key::from(1), ObjectRef(4)),
        Err(IndexError::KeyNotUnique)
    );
    assert_eq!(index.len(), 2);
}

#[test]
fn test_duplicates_spanning_many_leaves() {
    let mut index = Index::with_options(
        KeyType::I32,
        false,
        &crate::storage::indexes::IndexOptions {
            node_capacity: 4,
            ..Default::default()
        },
    );
    for oid in 0..200_u64 {
        let key = i32::try_from(oid % 3).expect("small key");
        index.put(Key::from(key), ObjectRef(oid)).expect("put");
    }
    index.validate().expect("valid tree");

    let ones: Vec<u64> = index
        .get_range(&crate::storage::btree::KeyRange::exact(Key::from(1)))
        .expect("range")
        .iter()
        .map(|obj| obj.oid())
        .collect();
    assert_eq!(ones, (0..200).filter(|n| n % 3 == 1).collect::<Vec<u64>>());
}
