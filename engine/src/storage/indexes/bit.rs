//! Object-to-mask index.
//!
//! A [`BitIndex`] associates each object with a 32-bit mask of boolean
//! properties and finds objects by bits that must be set and bits that
//! must be clear.

use crate::storage::btree::{BTree, Cursor, InsertMode, IterationOrder, KeyRange};
use crate::storage::error::IndexError;
use crate::storage::indexes::IndexOptions;
use crate::types::{Key, ObjectRef};

/// An index from object to a 32-bit property mask.
#[derive(Debug)]
pub struct BitIndex {
    tree: BTree<u32>,
}

impl BitIndex {
    /// Create an empty index with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&IndexOptions::default())
    }

    /// Create an empty index.
    #[must_use]
    pub fn with_options(options: &IndexOptions) -> Self {
        Self {
            tree: BTree::with_capacity(options.node_capacity),
        }
    }

    /// Number of indexed objects.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Check if no objects are indexed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Set the mask of `obj`, replacing any previous mask.
    pub fn put(&mut self, obj: ObjectRef, mask: u32) -> Result<(), IndexError> {
        self.tree
            .insert(Key::Object(obj), mask, InsertMode::Overwrite)
            .map(|_| ())
    }

    /// The mask of `obj`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::KeyNotFound`] if `obj` is not indexed.
    pub fn get(&self, obj: ObjectRef) -> Result<u32, IndexError> {
        self.tree
            .get(&Key::Object(obj))?
            .copied()
            .ok_or(IndexError::KeyNotFound)
    }

    /// Stop indexing `obj`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::KeyNotFound`] if `obj` is not indexed.
    pub fn remove(&mut self, obj: ObjectRef) -> Result<(), IndexError> {
        self.tree
            .remove(&Key::Object(obj), |_| true)?
            .map(|_| ())
            .ok_or(IndexError::KeyNotFound)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Check the structural invariants of the underlying tree.
    pub fn validate(&self) -> Result<(), IndexError> {
        self.tree.validate()
    }

    /// Create a detached cursor over objects whose mask has every bit of
    /// `set` and none of `clear`.
    #[must_use]
    pub const fn select_cursor(&self, set: u32, clear: u32) -> SelectCursor {
        SelectCursor {
            inner: self.tree.cursor(KeyRange::all(), IterationOrder::Ascending),
            set,
            clear,
        }
    }

    /// Iterate over objects whose mask has every bit of `set` and none of
    /// `clear`, in object order.
    #[must_use]
    pub const fn select(&self, set: u32, clear: u32) -> Select<'_> {
        Select {
            index: self,
            cursor: self.select_cursor(set, clear),
            failed: false,
        }
    }

    /// Iterate over every indexed object.
    #[must_use]
    pub const fn iter(&self) -> Select<'_> {
        self.select(0, 0)
    }
}

impl Default for BitIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// A detached, fail-fast cursor over the matches of a mask query.
#[derive(Debug, Clone)]
pub struct SelectCursor {
    inner: Cursor,
    set: u32,
    clear: u32,
}

impl SelectCursor {
    /// Advance to the next matching object.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ConcurrentModification`] if the index changed
    /// since the cursor was created or last reset.
    pub fn move_next(&mut self, index: &BitIndex) -> Result<bool, IndexError> {
        while self.inner.move_next(&index.tree)? {
            let mask = self.inner.current(&index.tree)?.value;
            if (mask & self.set) == self.set && (mask & self.clear) == 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The matching object the cursor is on.
    pub fn current(&self, index: &BitIndex) -> Result<ObjectRef, IndexError> {
        self.inner
            .current(&index.tree)?
            .key
            .as_object()
            .ok_or_else(|| IndexError::corrupt("bit index holds a non-object key"))
    }

    /// Rewind and accept the index's current state.
    pub const fn reset(&mut self, index: &BitIndex) {
        self.inner.reset(&index.tree);
    }
}

/// Iterator over the matches of a mask query on a borrowed [`BitIndex`].
#[derive(Debug)]
pub struct Select<'a> {
    index: &'a BitIndex,
    cursor: SelectCursor,
    failed: bool,
}

impl Iterator for Select<'_> {
    type Item = Result<ObjectRef, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let step = self
            .cursor
            .move_next(self.index)
            .and_then(|more| more.then(|| self.cursor.current(self.index)).transpose());
        match step {
            Ok(Some(obj)) => Some(Ok(obj)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
