//! Field indexes kept in step with an object store.

use crate::storage::btree::{IterationOrder, KeyRange};
use crate::storage::indexes::FieldIndex;
use crate::storage::{IndexError, ObjectStore};
use crate::testing::{KeySeq, Sample, sample};
use crate::types::{Key, ObjectRef};

struct Catalog {
    store: ObjectStore<Sample>,
    by_int: FieldIndex<Sample>,
    by_str: FieldIndex<Sample>,
}

impl Catalog {
    fn new() -> Self {
        Self {
            store: ObjectStore::new(),
            by_int: FieldIndex::new("int_key", true).expect("int index"),
            by_str: FieldIndex::new("str_key", false).expect("str index"),
        }
    }

    fn insert(&mut self, record: Sample) -> ObjectRef {
        let obj = self.store.allocate(record);
        let record = self.store.resolve(obj).expect("resolve");
        assert!(self.by_int.put(obj, record).expect("put"));
        self.by_str.put(obj, record).expect("put");
        obj
    }

    fn rename(&mut self, obj: ObjectRef, name: &str) {
        let record = self.store.resolve(obj).expect("resolve");
        assert!(self.by_str.remove(obj, record).expect("remove"));
        let record = self.store.resolve_mut(obj).expect("resolve");
        record.str_key = name.to_string();
        let record = self.store.resolve(obj).expect("resolve");
        self.by_str.put(obj, record).expect("put");
    }

    fn delete(&mut self, obj: ObjectRef) {
        let record = self.store.deallocate(obj).expect("deallocate");
        assert!(self.by_int.remove(obj, &record).expect("remove"));
        assert!(self.by_str.remove(obj, &record).expect("remove"));
    }
}

#[test]
fn test_indexes_follow_store_updates() {
    let mut catalog = Catalog::new();
    let objs: Vec<ObjectRef> = KeySeq::new()
        .take(500)
        .map(|key| catalog.insert(sample(key, &format!("name-{}", key % 37))))
        .collect();
    assert_eq!(catalog.by_int.len(), 500);
    assert_eq!(catalog.by_str.len(), 500);
    catalog.store.take_dirty();

    catalog.rename(objs[10], "renamed");
    assert_eq!(catalog.store.take_dirty(), vec![objs[10]]);
    assert_eq!(
        catalog.by_str.get(&Key::from("renamed")).expect("get"),
        Some(objs[10])
    );

    catalog.delete(objs[11]);
    assert!(catalog.store.is_deleted(objs[11]));
    assert_eq!(catalog.by_int.len(), 499);
    assert_eq!(catalog.by_str.len(), 499);

    let record = catalog.store.resolve(objs[12]).expect("resolve");
    assert_eq!(
        catalog.by_int.get(&Key::from(record.int_key)).expect("get"),
        Some(objs[12])
    );
}

#[test]
fn test_shared_names_are_ambiguous_for_point_lookup() {
    let mut catalog = Catalog::new();
    catalog.insert(sample(1, "same"));
    catalog.insert(sample(2, "same"));
    assert_eq!(
        catalog.by_str.get(&Key::from("same")),
        Err(IndexError::KeyNotUnique)
    );
    assert_eq!(
        catalog
            .by_str
            .get_range(&KeyRange::exact(Key::from("same")))
            .expect("range")
            .len(),
        2
    );
}

#[test]
fn test_append_numbers_records_in_order() {
    let mut store = ObjectStore::new();
    let mut index = FieldIndex::<Sample>::new("int_key", true).expect("create index");
    for name in ["a", "b", "c", "d"] {
        let obj = store.allocate(sample(0, name));
        let record = store.resolve_mut(obj).expect("resolve");
        index.append(obj, record).expect("append");
    }

    let numbers: Vec<i64> = store.iter().map(|(_, record)| record.int_key).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);

    let objs: Vec<ObjectRef> = index
        .range(KeyRange::inclusive(2_i64, 3_i64), IterationOrder::Descending)
        .expect("range")
        .collect::<Result<_, _>>()
        .expect("scan");
    let names: Vec<&str> = objs
        .iter()
        .map(|obj| store.resolve(*obj).expect("resolve").str_key.as_str())
        .collect();
    assert_eq!(names, vec!["c", "b"]);
}

#[test]
fn test_prefix_search_on_field() {
    let mut catalog = Catalog::new();
    for (i, name) in ["apple", "apricot", "banana", "avocado"].iter().enumerate() {
        catalog.insert(sample(i64::try_from(i).expect("small"), name));
    }
    let found = catalog.by_str.prefix_search("ap").expect("search");
    let names: Vec<&str> = found
        .iter()
        .map(|obj| catalog.store.resolve(*obj).expect("resolve").str_key.as_str())
        .collect();
    assert_eq!(names, vec!["apple", "apricot"]);
}

#[test]
fn test_index_registered_as_root() {
    let mut store = ObjectStore::new();
    let holder = store.allocate(sample(0, "holder"));
    store.set_root("samples_by_int", holder).expect("root");
    assert_eq!(store.root("samples_by_int"), Some(holder));
}
