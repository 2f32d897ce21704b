//! Key-to-object index.
//!
//! An [`Index`] maps keys of one [`KeyType`] to object references. A unique
//! index stores at most one object per key; a non-unique index stores
//! duplicates as separate tree entries, returned in insertion order.

use crate::storage::btree::{
    BTree, Comparator, Cursor, Entries, InsertMode, InsertOutcome, IterationOrder, KeyRange,
};
use crate::storage::error::IndexError;
use crate::storage::indexes::{IndexOptions, ObjectIndex, check_key, check_range, prefix_range};
use crate::types::{Key, KeyType, ObjectRef};

/// An ordered key-to-object index.
#[derive(Debug)]
pub struct Index {
    tree: BTree<ObjectRef>,
    key_type: KeyType,
    unique: bool,
}

impl Index {
    /// Create an empty index with default options.
    #[must_use]
    pub fn new(key_type: KeyType, unique: bool) -> Self {
        Self::with_options(key_type, unique, &IndexOptions::default())
    }

    /// Create an empty index.
    #[must_use]
    pub fn with_options(key_type: KeyType, unique: bool, options: &IndexOptions) -> Self {
        Self::with_comparator(key_type, unique, options, Comparator::default())
    }

    /// Create an empty index ordered by a custom comparator.
    #[must_use]
    pub fn with_comparator(
        key_type: KeyType,
        unique: bool,
        options: &IndexOptions,
        comparator: Comparator,
    ) -> Self {
        Self {
            tree: BTree::with_comparator(options.node_capacity, comparator),
            key_type,
            unique,
        }
    }

    /// The underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &BTree<ObjectRef> {
        &self.tree
    }

    /// Create a detached cursor over `range`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::IncompatibleKeyType`] if a bound does not match
    /// the key type.
    pub fn cursor(&self, range: KeyRange, order: IterationOrder) -> Result<IndexCursor, IndexError> {
        check_range(&self.key_type, &range)?;
        Ok(IndexCursor {
            inner: self.tree.cursor(range, order),
        })
    }

    /// Iterate over every object in ascending key order.
    #[must_use]
    pub const fn iter(&self) -> Iter<'_> {
        Iter {
            entries: self.tree.range(KeyRange::all(), IterationOrder::Ascending),
        }
    }

    /// Iterate over every object in descending key order.
    #[must_use]
    pub const fn reverse(&self) -> Iter<'_> {
        Iter {
            entries: self.tree.range(KeyRange::all(), IterationOrder::Descending),
        }
    }

    /// Iterate over the objects with keys in `range`.
    pub fn range(&self, range: KeyRange, order: IterationOrder) -> Result<Iter<'_>, IndexError> {
        check_range(&self.key_type, &range)?;
        Ok(Iter {
            entries: self.tree.range(range, order),
        })
    }

    /// Iterate over the objects whose string key starts with `prefix`.
    pub fn starts_with(&self, prefix: &str, order: IterationOrder) -> Result<Iter<'_>, IndexError> {
        let range = prefix_range(&self.key_type, prefix)?;
        Ok(Iter {
            entries: self.tree.range(range, order),
        })
    }

    /// Iterate over `(key, object)` entries in `range`.
    pub fn range_entries(
        &self,
        range: KeyRange,
        order: IterationOrder,
    ) -> Result<Entries<'_, ObjectRef>, IndexError> {
        check_range(&self.key_type, &range)?;
        Ok(self.tree.range(range, order))
    }
}

impl ObjectIndex for Index {
    fn key_type(&self) -> &KeyType {
        &self.key_type
    }

    fn is_unique(&self) -> bool {
        self.unique
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn put(&mut self, key: Key, obj: ObjectRef) -> Result<bool, IndexError> {
        check_key(&self.key_type, &key)?;
        let mode = if self.unique {
            InsertMode::Unique
        } else {
            InsertMode::Duplicate
        };
        Ok(self.tree.insert(key, obj, mode)? == InsertOutcome::Inserted)
    }

    fn set(&mut self, key: Key, obj: ObjectRef) -> Result<Option<ObjectRef>, IndexError> {
        check_key(&self.key_type, &key)?;
        if !self.unique && self.tree.count_equal(&key, 2)? > 1 {
            return Err(IndexError::KeyNotUnique);
        }
        match self.tree.insert(key, obj, InsertMode::Overwrite)? {
            InsertOutcome::Replaced(previous) => Ok(Some(previous)),
            InsertOutcome::Inserted | InsertOutcome::Duplicate => Ok(None),
        }
    }

    fn remove(&mut self, key: &Key, obj: ObjectRef) -> Result<(), IndexError> {
        check_key(&self.key_type, key)?;
        self.tree
            .remove(key, |stored| *stored == obj)?
            .map(|_| ())
            .ok_or(IndexError::KeyNotFound)
    }

    fn remove_key(&mut self, key: &Key) -> Result<ObjectRef, IndexError> {
        check_key(&self.key_type, key)?;
        if !self.unique {
            return Err(IndexError::KeyNotUnique);
        }
        self.tree.remove(key, |_| true)?.ok_or(IndexError::KeyNotFound)
    }

    fn get(&self, key: &Key) -> Result<Option<ObjectRef>, IndexError> {
        check_key(&self.key_type, key)?;
        if !self.unique && self.tree.count_equal(key, 2)? > 1 {
            return Err(IndexError::KeyNotUnique);
        }
        Ok(self.tree.get(key)?.copied())
    }

    fn get_range_ordered(
        &self,
        range: &KeyRange,
        order: IterationOrder,
    ) -> Result<Vec<ObjectRef>, IndexError> {
        self.range(range.clone(), order)?.collect()
    }

    fn prefix_search(&self, prefix: &str) -> Result<Vec<ObjectRef>, IndexError> {
        self.starts_with(prefix, IterationOrder::Ascending)?
            .collect()
    }

    fn contains(&self, key: &Key, obj: ObjectRef) -> Result<bool, IndexError> {
        check_key(&self.key_type, key)?;
        self.tree.contains(key, |stored| *stored == obj)
    }

    fn entries(&self, order: IterationOrder) -> Result<Vec<(Key, ObjectRef)>, IndexError> {
        self.tree
            .range(KeyRange::all(), order)
            .map(|entry| entry.map(|(key, obj)| (key.clone(), *obj)))
            .collect()
    }

    fn to_vec(&self) -> Result<Vec<ObjectRef>, IndexError> {
        self.iter().collect()
    }

    fn clear(&mut self) {
        self.tree.clear();
    }

    fn modification_count(&self) -> u64 {
        self.tree.modification_count()
    }

    fn validate(&self) -> Result<(), IndexError> {
        self.tree.validate()
    }
}

/// A detached, fail-fast cursor over an [`Index`].
///
/// The cursor holds no borrow, so it may be kept across lock releases; every
/// call takes the index it was created from.
#[derive(Debug, Clone)]
pub struct IndexCursor {
    inner: Cursor,
}

impl IndexCursor {
    /// Advance to the next object in range.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ConcurrentModification`] if the index changed
    /// since the cursor was created or last reset.
    pub fn move_next(&mut self, index: &Index) -> Result<bool, IndexError> {
        self.inner.move_next(&index.tree)
    }

    /// The object the cursor is on.
    pub fn current(&self, index: &Index) -> Result<ObjectRef, IndexError> {
        Ok(self.inner.current(&index.tree)?.value)
    }

    /// The key of the entry the cursor is on.
    pub fn current_key<'a>(&self, index: &'a Index) -> Result<&'a Key, IndexError> {
        Ok(&self.inner.current(&index.tree)?.key)
    }

    /// Rewind and accept the index's current state.
    pub const fn reset(&mut self, index: &Index) {
        self.inner.reset(&index.tree);
    }
}

/// Iterator over the objects of a borrowed [`Index`].
#[derive(Debug)]
pub struct Iter<'a> {
    entries: Entries<'a, ObjectRef>,
}

impl Iterator for Iter<'_> {
    type Item = Result<ObjectRef, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|entry| entry.map(|(_, obj)| *obj))
    }
}
