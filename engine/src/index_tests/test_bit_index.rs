//! Selecting objects by required and forbidden property bits.

use crate::storage::IndexError;
use crate::storage::indexes::BitIndex;
use crate::testing::{KeySeq, obj};
use crate::types::ObjectRef;

const OBJECTS: usize = 3000;

fn mask_of(key: i64) -> u32 {
    u32::try_from(key & 0xff).expect("masked")
}

fn populated() -> (BitIndex, Vec<u32>) {
    let mut index = BitIndex::new();
    let masks: Vec<u32> = KeySeq::new().take(OBJECTS).map(mask_of).collect();
    for (n, mask) in masks.iter().enumerate() {
        index.put(obj(n), *mask).expect("put");
    }
    (index, masks)
}

#[test]
fn test_select_matches_brute_force() {
    let (index, masks) = populated();
    for (set, clear) in [(0b1, 0), (0b11, 0b100), (0, 0b1000_0000), (0xf0, 0x0f)] {
        let selected: Vec<ObjectRef> = index
            .select(set, clear)
            .collect::<Result<_, _>>()
            .expect("select");
        let expected: Vec<ObjectRef> = masks
            .iter()
            .enumerate()
            .filter(|(_, m)| *m & set == set && *m & clear == 0)
            .map(|(n, _)| obj(n))
            .collect();
        assert_eq!(selected, expected, "set {set:#b} clear {clear:#b}");
    }
}

#[test]
fn test_get_put_remove() {
    let (mut index, masks) = populated();
    assert_eq!(index.len(), OBJECTS);
    assert_eq!(index.get(obj(5)).expect("get"), masks[5]);

    index.put(obj(5), 0xffff_ffff).expect("put");
    assert_eq!(index.get(obj(5)).expect("get"), 0xffff_ffff);
    assert_eq!(index.len(), OBJECTS);

    index.remove(obj(5)).expect("remove");
    assert_eq!(index.get(obj(5)), Err(IndexError::KeyNotFound));
    assert_eq!(index.remove(obj(5)), Err(IndexError::KeyNotFound));
    assert_eq!(index.len(), OBJECTS - 1);
    index.validate().expect("valid tree");
}

#[test]
fn test_iter_visits_every_object_in_order() {
    let (index, _) = populated();
    let all: Vec<ObjectRef> = index.iter().collect::<Result<_, _>>().expect("iter");
    assert_eq!(all.len(), OBJECTS);
    assert!(all.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_clear() {
    let (mut index, _) = populated();
    index.clear();
    assert!(index.is_empty());
    assert_eq!(index.select(0, 0).count(), 0);
}
