//! Readers and writers sharing structures through [`SharedIndex`].

use std::thread;

use crate::storage::btree::{IterationOrder, KeyRange};
use crate::storage::indexes::{Index, ObjectIndex};
use crate::storage::{IndexError, SharedIndex};
use crate::testing::ring::Ring;
use crate::types::{Key, KeyType, ObjectRef};

const THREADS: usize = 4;
const ITERATIONS: usize = 100;
const RING_LEN: usize = 64;

#[test]
fn test_ring_rotations_never_tear() {
    let shared = SharedIndex::new(Ring::with_counts(RING_LEN));
    let expected_sum = i64::try_from(RING_LEN * (RING_LEN - 1) / 2).expect("fits");

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    let (n, sum) = shared.read().expect("read").walk();
                    assert_eq!(n, RING_LEN);
                    assert_eq!(sum, expected_sum);
                    shared.write().expect("write").rotate();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(shared.read().expect("read").walk(), (RING_LEN, expected_sum));
    assert_eq!(shared.handle_count(), 1);
}

/// Walk the whole index in batches, releasing the lock between batches.
/// A write in between restarts the walk. Returns the keys of the final,
/// uninterrupted walk and the number of restarts.
fn scan_in_batches(shared: &SharedIndex<Index>, batch: usize) -> (Vec<i64>, usize) {
    let mut cursor = shared
        .read()
        .expect("read")
        .cursor(KeyRange::all(), IterationOrder::Ascending)
        .expect("cursor");
    let mut keys = Vec::new();
    let mut restarts = 0;
    loop {
        let index = shared.read().expect("read");
        for _ in 0..batch {
            match cursor.move_next(&index) {
                Ok(true) => {
                    let Key::I64(key) = cursor.current_key(&index).expect("key") else {
                        panic!("non-integer key");
                    };
                    keys.push(*key);
                }
                Ok(false) => return (keys, restarts),
                Err(IndexError::ConcurrentModification) => {
                    cursor.reset(&index);
                    keys.clear();
                    restarts += 1;
                    break;
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
    }
}

#[test]
fn test_readers_resume_cursors_across_writers() {
    let shared = SharedIndex::new(Index::new(KeyType::I64, true));
    let per_writer: u32 = 250;

    let writers: Vec<_> = (0..2_u32)
        .map(|writer| {
            let shared = shared.clone();
            thread::spawn(move || {
                for n in 0..per_writer {
                    let key = n * 2 + writer;
                    let mut index = shared.write().expect("write");
                    let inserted = index
                        .put(Key::I64(i64::from(key)), ObjectRef(u64::from(key) + 1))
                        .expect("put");
                    assert!(inserted);
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    let (keys, _) = scan_in_batches(&shared, 16);
                    assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys out of order");
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().expect("thread panicked");
    }

    let (keys, restarts) = scan_in_batches(&shared, 16);
    assert_eq!(restarts, 0);
    let expected: Vec<i64> = (0..i64::from(per_writer * 2)).collect();
    assert_eq!(keys, expected);
    shared.read().expect("read").validate().expect("valid tree");
}
