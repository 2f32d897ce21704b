//! Compound keys order by their first field, then by the next.

use std::ops::Bound::{Excluded, Included};

use crate::storage::IndexError;
use crate::storage::btree::{IterationOrder, KeyRange};
use crate::storage::indexes::{FieldIndex, IndexOptions};
use crate::testing::{KeySeq, Sample, obj, sample};
use crate::types::{Key, KeyType, ObjectRef};

const RECORDS: usize = 2000;

fn compound_index() -> (FieldIndex<Sample>, Vec<Sample>) {
    let options = IndexOptions {
        node_capacity: 8,
        ..Default::default()
    };
    let mut index = FieldIndex::<Sample>::compound(&["int_key", "str_key"], false, &options)
        .expect("create index");
    let records: Vec<Sample> = KeySeq::new()
        .take(RECORDS)
        .map(|key| sample(key % 50, &key.to_string()))
        .collect();
    for (n, record) in records.iter().enumerate() {
        assert!(index.put(obj(n), record).expect("put"));
    }
    (index, records)
}

fn split(key: &Key) -> (i64, String) {
    match key {
        Key::Composite(fields) => match fields.as_slice() {
            [Key::I64(i), Key::String(s)] => (*i, s.clone()),
            other => panic!("unexpected fields {other:?}"),
        },
        other => panic!("unexpected key {other}"),
    }
}

fn scan(index: &FieldIndex<Sample>, order: IterationOrder) -> Vec<(i64, String, ObjectRef)> {
    index
        .index()
        .range_entries(KeyRange::all(), order)
        .expect("range")
        .map(|entry| {
            let (key, obj) = entry.expect("scan");
            let (i, s) = split(key);
            (i, s, *obj)
        })
        .collect()
}

#[test]
fn test_key_type_is_composite() {
    let (index, _) = compound_index();
    assert_eq!(
        index.key_type(),
        &KeyType::Composite(vec![KeyType::I64, KeyType::String])
    );
    assert_eq!(index.len(), RECORDS);
}

#[test]
fn test_ascending_orders_by_int_then_string() {
    let (index, _) = compound_index();
    let ascending = scan(&index, IterationOrder::Ascending);
    assert_eq!(ascending.len(), RECORDS);
    for pair in ascending.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.0 < b.0 || (a.0 == b.0 && a.1 <= b.1), "{a:?} before {b:?}");
    }
}

#[test]
fn test_descending_is_exact_reverse() {
    let (index, _) = compound_index();
    let mut ascending = scan(&index, IterationOrder::Ascending);
    let descending = scan(&index, IterationOrder::Descending);
    ascending.reverse();
    assert_eq!(ascending, descending);
}

#[test]
fn test_leading_field_prefix_range() {
    let (index, records) = compound_index();
    let prefix = Key::composite(vec![Key::I64(7)]);
    let found = index
        .get_range(&KeyRange::exact(prefix))
        .expect("range");

    let expected = records.iter().filter(|r| r.int_key == 7).count();
    assert!(expected > 0);
    assert_eq!(found.len(), expected);
    for obj in found {
        let n = usize::try_from(obj.oid() - 1).expect("index");
        assert_eq!(records[n].int_key, 7);
    }

    let between = index
        .get_range(&KeyRange::inclusive(
            Key::composite(vec![Key::I64(10)]),
            Key::composite(vec![Key::I64(12)]),
        ))
        .expect("range");
    let expected = records
        .iter()
        .filter(|r| (10..=12).contains(&r.int_key))
        .count();
    assert_eq!(between.len(), expected);
}

#[test]
fn test_full_key_lookup() {
    let (index, records) = compound_index();
    let record = &records[123];
    let key = index.key_of(record).expect("key");
    assert!(index.contains(obj(123), record).expect("contains"));
    let found = index.get_range(&KeyRange::exact(key)).expect("range");
    assert!(found.contains(&obj(123)));
}

#[test]
fn test_wrong_key_shape_is_rejected() {
    let (index, _) = compound_index();
    let reversed = Key::composite(vec![Key::from("1"), Key::I64(1)]);
    assert!(matches!(
        index.get(&reversed),
        Err(IndexError::IncompatibleKeyType { .. })
    ));
    assert!(matches!(
        index.get(&Key::I64(1)),
        Err(IndexError::IncompatibleKeyType { .. })
    ));
}

#[test]
fn test_unique_compound_index() {
    let mut index = FieldIndex::<Sample>::compound(
        &["str_key", "int_key"],
        true,
        &IndexOptions::default(),
    )
    .expect("create index");
    assert!(index.put(ObjectRef(1), &sample(1, "x")).expect("put"));
    assert!(index.put(ObjectRef(2), &sample(2, "x")).expect("put"));
    assert!(!index.put(ObjectRef(3), &sample(1, "x")).expect("put"));
    assert_eq!(
        index.set(ObjectRef(3), &sample(1, "x")).expect("set"),
        Some(ObjectRef(1))
    );
    assert_eq!(index.len(), 2);
}

/// Ten integers, each paired with the letters `a` to `d`.
fn grid_index() -> FieldIndex<Sample> {
    let options = IndexOptions {
        node_capacity: 4,
        ..Default::default()
    };
    let mut index = FieldIndex::<Sample>::compound(&["int_key", "str_key"], true, &options)
        .expect("create index");
    let mut oid = 0;
    for letter in ["d", "b", "a", "c"] {
        for int_key in (0..10).rev() {
            oid += 1;
            assert!(index.put(ObjectRef(oid), &sample(int_key, letter)).expect("put"));
        }
    }
    index
}

fn prefix(int_key: i64) -> Key {
    Key::composite(vec![Key::I64(int_key)])
}

fn full(int_key: i64, letter: &str) -> Key {
    Key::composite(vec![Key::I64(int_key), Key::from(letter)])
}

fn range_keys(
    index: &FieldIndex<Sample>,
    range: KeyRange,
    order: IterationOrder,
) -> Vec<(i64, String)> {
    index
        .index()
        .range_entries(range, order)
        .expect("range")
        .map(|entry| split(entry.expect("scan").0))
        .collect()
}

fn pairs(expected: &[(i64, &str)]) -> Vec<(i64, String)> {
    expected.iter().map(|(i, s)| (*i, (*s).to_string())).collect()
}

#[test]
fn test_prefix_low_full_high_range() {
    let index = grid_index();
    let range = KeyRange::new(Included(prefix(3)), Included(full(5, "b")));

    let ascending = range_keys(&index, range.clone(), IterationOrder::Ascending);
    assert_eq!(
        ascending,
        pairs(&[
            (3, "a"),
            (3, "b"),
            (3, "c"),
            (3, "d"),
            (4, "a"),
            (4, "b"),
            (4, "c"),
            (4, "d"),
            (5, "a"),
            (5, "b"),
        ])
    );

    let mut descending = range_keys(&index, range, IterationOrder::Descending);
    descending.reverse();
    assert_eq!(descending, ascending);
}

#[test]
fn test_excluded_prefix_bounds() {
    let index = grid_index();

    let between = KeyRange::new(Excluded(prefix(3)), Excluded(prefix(5)));
    assert_eq!(
        range_keys(&index, between, IterationOrder::Ascending),
        pairs(&[(4, "a"), (4, "b"), (4, "c"), (4, "d")])
    );

    let mixed = KeyRange::new(Excluded(prefix(7)), Excluded(full(9, "c")));
    assert_eq!(
        range_keys(&index, mixed, IterationOrder::Ascending),
        pairs(&[
            (8, "a"),
            (8, "b"),
            (8, "c"),
            (8, "d"),
            (9, "a"),
            (9, "b"),
        ])
    );

    let empty = KeyRange::new(Excluded(prefix(4)), Excluded(prefix(5)));
    assert!(range_keys(&index, empty, IterationOrder::Ascending).is_empty());
}
