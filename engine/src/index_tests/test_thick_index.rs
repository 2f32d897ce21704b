//! Thick indexes with thousands of objects per key.

use crate::storage::IndexError;
use crate::storage::btree::{IterationOrder, KeyRange};
use crate::storage::indexes::{DEFAULT_THICK_THRESHOLD, ObjectIndex, ThickIndex};
use crate::testing::{KeySeq, SCENARIO_SIZE, obj, oids};
use crate::types::{Key, KeyType, ObjectRef};

const DISTINCT_KEYS: i64 = 10;

fn populated() -> (ThickIndex, Vec<i64>) {
    let mut index = ThickIndex::new(KeyType::I64);
    let keys: Vec<i64> = KeySeq::new()
        .take(SCENARIO_SIZE)
        .map(|key| key % DISTINCT_KEYS)
        .collect();
    for (n, key) in keys.iter().enumerate() {
        assert!(index.put(Key::from(*key), obj(n)).expect("put"));
    }
    (index, keys)
}

#[test]
fn test_every_key_is_upgraded() {
    let (index, _) = populated();
    assert_eq!(index.len(), SCENARIO_SIZE);
    assert_eq!(index.key_count(), 10);
    for key in 0..DISTINCT_KEYS {
        assert!(index.is_upgraded(&Key::from(key)).expect("upgraded"));
    }
    index.validate().expect("valid index");
}

#[test]
fn test_range_per_key_returns_its_objects_in_order() {
    let (index, keys) = populated();
    for key in 0..DISTINCT_KEYS {
        let found = oids(
            &index
                .get_range(&KeyRange::exact(Key::from(key)))
                .expect("range"),
        );
        let expected: Vec<u64> = keys
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == key)
            .map(|(n, _)| obj(n).oid())
            .collect();
        assert_eq!(found, expected, "key {key}");
    }
}

#[test]
fn test_contains_and_remove() {
    let (mut index, keys) = populated();
    for (n, key) in keys.iter().enumerate().step_by(3) {
        assert!(index.contains(&Key::from(*key), obj(n)).expect("contains"));
        index.remove(&Key::from(*key), obj(n)).expect("remove");
        assert!(!index.contains(&Key::from(*key), obj(n)).expect("contains"));
    }
    let removed = keys.len().div_ceil(3);
    assert_eq!(index.len(), SCENARIO_SIZE - removed);
    index.validate().expect("valid index");

    let (key, n) = (keys[0], 0);
    assert_eq!(
        index.remove(&Key::from(key), obj(n)),
        Err(IndexError::KeyNotFound)
    );
}

#[test]
fn test_full_scan_in_both_orders() {
    let (index, _) = populated();
    let forward: Vec<_> = index.iter().map(|o| o.expect("scan")).collect();
    let mut backward: Vec<_> = index.reverse().map(|o| o.expect("scan")).collect();
    backward.reverse();
    assert_eq!(forward.len(), SCENARIO_SIZE);
    assert_eq!(forward, backward);

    let entries = index.entries(IterationOrder::Ascending).expect("entries");
    assert!(entries.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[test]
fn test_below_threshold_stays_inline() {
    let mut index = ThickIndex::new(KeyType::String);
    let limit = u64::try_from(DEFAULT_THICK_THRESHOLD).expect("threshold");
    for oid in 0..limit {
        index.put(Key::from("tag"), ObjectRef(oid)).expect("put");
    }
    assert!(!index.is_upgraded(&Key::from("tag")).expect("upgraded"));
    index
        .put(Key::from("tag"), ObjectRef(limit))
        .expect("put");
    assert!(index.is_upgraded(&Key::from("tag")).expect("upgraded"));
}

#[test]
fn test_clear_empties_every_bucket() {
    let (mut index, _) = populated();
    index.clear();
    assert!(index.is_empty());
    assert_eq!(index.key_count(), 0);
    assert!(index.to_vec().expect("scan").is_empty());
    index.validate().expect("valid index");
}
