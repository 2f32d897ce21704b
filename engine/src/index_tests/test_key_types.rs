//! Every scalar key type sorts in its natural order.

use uuid::Uuid;

use crate::storage::IndexError;
use crate::storage::btree::IterationOrder;
use crate::storage::indexes::{Index, ObjectIndex};
use crate::types::{DateTime, Decimal, Key, KeyType, ObjectRef};

/// Insert `keys` in the given order and check the index returns them sorted.
fn assert_sorted(key_type: KeyType, keys: Vec<Key>) {
    let mut index = Index::new(key_type.clone(), true);
    for (oid, key) in (1..).zip(&keys) {
        assert!(
            index.put(key.clone(), ObjectRef(oid)).expect("put"),
            "{key} inserted twice"
        );
    }
    index.validate().expect("valid tree");

    let mut expected = keys;
    expected.sort();
    let ascending: Vec<Key> = index
        .entries(IterationOrder::Ascending)
        .expect("scan")
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    assert_eq!(ascending, expected, "{key_type} ascending");

    expected.reverse();
    let descending: Vec<Key> = index
        .entries(IterationOrder::Descending)
        .expect("scan")
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    assert_eq!(descending, expected, "{key_type} descending");
}

fn keys<T: Into<Key>>(values: impl IntoIterator<Item = T>) -> Vec<Key> {
    values.into_iter().map(Into::into).collect()
}

#[test]
fn test_integer_types() {
    assert_sorted(KeyType::Bool, keys([true, false]));
    assert_sorted(KeyType::I8, keys([3_i8, i8::MIN, -1, i8::MAX, 0]));
    assert_sorted(KeyType::U8, keys([200_u8, 0, 7, u8::MAX]));
    assert_sorted(KeyType::I16, keys([-300_i16, 300, i16::MIN, 0]));
    assert_sorted(KeyType::U16, keys([u16::MAX, 1_u16, 40_000]));
    assert_sorted(KeyType::I32, keys([0_i32, -70_000, i32::MAX, i32::MIN]));
    assert_sorted(KeyType::U32, keys([u32::MAX, 5_u32, 0]));
    assert_sorted(KeyType::I64, keys([i64::MIN, 1_i64, -1, i64::MAX]));
    assert_sorted(KeyType::U64, keys([u64::MAX, 1_u64 << 63, 0]));
}

#[test]
fn test_float_types() {
    assert_sorted(
        KeyType::F32,
        keys([1.5_f32, f32::NEG_INFINITY, -0.25, f32::MAX, 0.0]),
    );
    assert_sorted(
        KeyType::F64,
        keys([f64::INFINITY, -1e300_f64, 2.5, f64::MIN_POSITIVE, -2.5]),
    );
}

#[test]
fn test_decimal_keys_compare_by_value() {
    let dec = |mantissa, scale| Decimal::new(mantissa, scale).expect("scale");
    assert_sorted(
        KeyType::Decimal,
        keys([dec(15, 1), dec(-3, 0), dec(149, 2), dec(2, 0), dec(1, 28)]),
    );

    // 1.50 and 1.5 are the same key.
    let mut index = Index::new(KeyType::Decimal, true);
    assert!(index.put(Key::from(dec(150, 2)), ObjectRef(1)).expect("put"));
    assert!(!index.put(Key::from(dec(15, 1)), ObjectRef(2)).expect("put"));
}

#[test]
fn test_date_time_and_guid_keys() {
    assert_sorted(
        KeyType::DateTime,
        keys([DateTime(10), DateTime::MIN, DateTime(-10), DateTime::MAX]),
    );
    assert_sorted(
        KeyType::Guid,
        keys([
            Uuid::from_u128(0xff),
            Uuid::nil(),
            Uuid::from_u128(u128::MAX),
            Uuid::from_u128(1 << 64),
        ]),
    );
}

#[test]
fn test_object_keys_order_by_identity() {
    assert_sorted(
        KeyType::Object,
        keys([ObjectRef(9), ObjectRef(2), ObjectRef(100), ObjectRef(1)]),
    );
}

#[test]
fn test_mismatched_keys_are_rejected() {
    let mut index = Index::new(KeyType::I32, false);
    index.put(Key::from(1_i32), ObjectRef(1)).expect("put");

    for key in [Key::from(1_i64), Key::from(1_u32), Key::from("1"), Key::from(1.0_f64)] {
        assert!(matches!(
            index.put(key.clone(), ObjectRef(2)),
            Err(IndexError::IncompatibleKeyType { .. })
        ));
        assert!(matches!(
            index.get(&key),
            Err(IndexError::IncompatibleKeyType { .. })
        ));
    }
    assert_eq!(index.len(), 1);
}
