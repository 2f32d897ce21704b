//! Key ordering strategies for the tree.
//!
//! A tree orders entries with two functions: one comparing two stored
//! keys, used when placing a new entry, and one comparing a stored key
//! against a search key, used for lookups and range bounds. They differ
//! for composite keys, where a search key may name only the leading
//! fields.

use std::cmp::Ordering;

use crate::types::Key;

/// A pair of comparison functions used by a tree.
#[derive(Debug, Clone, Copy)]
pub struct Comparator {
    compare_entries: fn(&Key, &Key) -> Ordering,
    compare_entry_with_key: fn(&Key, &Key) -> Ordering,
}

impl Comparator {
    /// Build a comparator from its two functions.
    ///
    /// # Pre-conditions
    ///
    /// - Both functions must induce the same total order on full keys.
    /// - For a fixed search key, `compare_entry_with_key` must be monotone
    ///   in the stored key.
    #[must_use]
    pub const fn new(
        compare_entries: fn(&Key, &Key) -> Ordering,
        compare_entry_with_key: fn(&Key, &Key) -> Ordering,
    ) -> Self {
        Self {
            compare_entries,
            compare_entry_with_key,
        }
    }

    /// Compare two stored keys.
    #[must_use]
    pub fn entries(&self, a: &Key, b: &Key) -> Ordering {
        (self.compare_entries)(a, b)
    }

    /// Compare a stored key against a search key.
    #[must_use]
    pub fn entry_with_key(&self, entry: &Key, key: &Key) -> Ordering {
        (self.compare_entry_with_key)(entry, key)
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(Key::cmp, compare_prefix)
    }
}

/// Compare a stored key against a search key that may be a composite
/// prefix.
///
/// When both are composite, only the fields present in `key` take part, so
/// a bound of `(1)` is equal to every stored `(1, _)`.
#[must_use]
pub fn compare_prefix(entry: &Key, key: &Key) -> Ordering {
    match (entry, key) {
        (Key::Composite(stored), Key::Composite(search)) => stored
            .iter()
            .zip(search)
            .map(|(a, b)| a.cmp(b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal),
        _ => entry.cmp(key),
    }
}
