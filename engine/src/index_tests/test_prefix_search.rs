//! Prefix search over string keys.

use crate::storage::IndexError;
use crate::storage::btree::IterationOrder;
use crate::storage::indexes::{Index, ObjectIndex, ThickIndex};
use crate::testing::{KeySeq, oids};
use crate::types::{Key, KeyType, ObjectRef};

fn numbered() -> Index {
    let mut index = Index::new(KeyType::String, true);
    for (oid, key) in [(1, "100"), (2, "101"), (3, "200")] {
        index.put(Key::from(key), ObjectRef(oid)).expect("put");
    }
    index
}

#[test]
fn test_prefix_matches_in_ascending_order() {
    let index = numbered();
    assert_eq!(oids(&index.prefix_search("1").expect("search")), vec![1, 2]);
    assert_eq!(oids(&index.prefix_search("10").expect("search")), vec![1, 2]);
    assert_eq!(oids(&index.prefix_search("101").expect("search")), vec![2]);
    assert!(index.prefix_search("9").expect("search").is_empty());
    assert!(index.prefix_search("1010").expect("search").is_empty());
}

#[test]
fn test_empty_prefix_matches_everything() {
    let index = numbered();
    assert_eq!(oids(&index.prefix_search("").expect("search")), vec![1, 2, 3]);
}

#[test]
fn test_prefix_descending() {
    let index = numbered();
    let objs: Vec<ObjectRef> = index
        .starts_with("1", IterationOrder::Descending)
        .expect("search")
        .collect::<Result<_, _>>()
        .expect("scan");
    assert_eq!(oids(&objs), vec![2, 1]);
}

#[test]
fn test_prefix_boundary_characters() {
    let mut index = Index::new(KeyType::String, true);
    let keys = ["a", "a\u{7f}", "ab", "a\u{10ffff}", "b", "\u{10ffff}"];
    for (oid, key) in (1..).zip(keys) {
        index.put(Key::from(key), ObjectRef(oid)).expect("put");
    }
    assert_eq!(
        oids(&index.prefix_search("a").expect("search")),
        vec![1, 3, 2, 4]
    );
    assert_eq!(oids(&index.prefix_search("\u{10ffff}").expect("search")), vec![6]);
}

#[test]
fn test_prefix_against_full_scan() {
    let mut index = Index::new(KeyType::String, false);
    let keys: Vec<String> = KeySeq::new().take(3000).map(|k| k.to_string()).collect();
    for (oid, key) in (1..).zip(&keys) {
        index.put(Key::from(key.as_str()), ObjectRef(oid)).expect("put");
    }

    for prefix in ["1", "42", "999", "5000"] {
        let mut expected: Vec<(&String, u64)> = keys
            .iter()
            .zip(1..)
            .filter(|(key, _)| key.starts_with(prefix))
            .collect();
        expected.sort();
        let found = oids(&index.prefix_search(prefix).expect("search"));
        assert_eq!(
            found,
            expected.iter().map(|(_, oid)| *oid).collect::<Vec<u64>>(),
            "prefix {prefix}"
        );
    }
}

#[test]
fn test_prefix_search_on_thick_index() {
    let mut index = ThickIndex::new(KeyType::String);
    index.put(Key::from("cat"), ObjectRef(1)).expect("put");
    index.put(Key::from("car"), ObjectRef(2)).expect("put");
    index.put(Key::from("cat"), ObjectRef(3)).expect("put");
    index.put(Key::from("dog"), ObjectRef(4)).expect("put");
    assert_eq!(oids(&index.prefix_search("ca").expect("search")), vec![2, 1, 3]);
}

#[test]
fn test_prefix_search_requires_string_keys() {
    let index = Index::new(KeyType::I32, true);
    assert!(matches!(
        index.prefix_search("1"),
        Err(IndexError::IncompatibleKeyType { .. })
    ));
}
