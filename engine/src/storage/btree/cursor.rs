//! Range cursors over a [`BTree`].
//!
//! A [`Cursor`] is detached from the tree it walks: it stores its range,
//! direction and position, and every call takes the tree as an argument.
//! That lets a cursor outlive a lock guard, which is how iteration in
//! shared indexes detects modification by other threads. On creation and
//! on [`Cursor::reset`] the cursor records the tree's modification count;
//! if the count has moved on by the next [`Cursor::move_next`], the call
//! fails with [`IndexError::ConcurrentModification`].
//!
//! [`Entries`] wraps a cursor and a shared borrow of the tree into a
//! standard iterator.

use std::ops::Bound;

use crate::storage::btree::comparator::Comparator;
use crate::storage::btree::node::LeafEntry;
use crate::storage::btree::tree::{BTree, Position};
use crate::storage::error::IndexError;
use crate::types::Key;

/// Direction of iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterationOrder {
    #[default]
    Ascending,
    Descending,
}

/// A pair of optional, inclusive or exclusive key bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    low: Bound<Key>,
    high: Bound<Key>,
}

impl KeyRange {
    /// The unbounded range.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            low: Bound::Unbounded,
            high: Bound::Unbounded,
        }
    }

    /// A range with explicit bounds.
    #[must_use]
    pub const fn new(low: Bound<Key>, high: Bound<Key>) -> Self {
        Self { low, high }
    }

    /// The range `[low, high]`.
    #[must_use]
    pub fn inclusive(low: impl Into<Key>, high: impl Into<Key>) -> Self {
        Self::new(Bound::Included(low.into()), Bound::Included(high.into()))
    }

    /// Every key equal to `key`.
    #[must_use]
    pub fn exact(key: Key) -> Self {
        Self::new(Bound::Included(key.clone()), Bound::Included(key))
    }

    /// Every string key starting with `prefix`.
    ///
    /// Strings order by UTF-8 bytes, which matches code point order, so the
    /// matches are exactly `[prefix, successor)` where the successor bumps the
    /// last code point that can be bumped. An empty prefix, or one made only
    /// of `char::MAX`, has no successor and the range is open above.
    #[must_use]
    pub fn prefix(prefix: &str) -> Self {
        let high = prefix_successor(prefix).map_or(Bound::Unbounded, |s| Bound::Excluded(Key::String(s)));
        Self::new(Bound::Included(Key::from(prefix)), high)
    }

    /// Lower bound.
    #[must_use]
    pub const fn low(&self) -> &Bound<Key> {
        &self.low
    }

    /// Upper bound.
    #[must_use]
    pub const fn high(&self) -> &Bound<Key> {
        &self.high
    }

    /// Keys named by the bounds.
    pub fn bound_keys(&self) -> impl Iterator<Item = &Key> {
        [&self.low, &self.high]
            .into_iter()
            .filter_map(|bound| match bound {
                Bound::Included(key) | Bound::Excluded(key) => Some(key),
                Bound::Unbounded => None,
            })
    }

    /// Check whether `key` sorts before the lower bound.
    pub(crate) fn is_below(&self, comparator: &Comparator, key: &Key) -> bool {
        match &self.low {
            Bound::Unbounded => false,
            Bound::Included(low) => comparator.entry_with_key(key, low).is_lt(),
            Bound::Excluded(low) => comparator.entry_with_key(key, low).is_le(),
        }
    }

    /// Check whether `key` sorts after the upper bound.
    pub(crate) fn is_above(&self, comparator: &Comparator, key: &Key) -> bool {
        match &self.high {
            Bound::Unbounded => false,
            Bound::Included(high) => comparator.entry_with_key(key, high).is_gt(),
            Bound::Excluded(high) => comparator.entry_with_key(key, high).is_ge(),
        }
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::all()
    }
}

/// Smallest string greater than every string starting with `prefix`.
fn prefix_successor(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = next_char(last) {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

fn next_char(c: char) -> Option<char> {
    match c {
        '\u{D7FF}' => Some('\u{E000}'),
        char::MAX => None,
        c => char::from_u32(u32::from(c) + 1),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    NotStarted,
    Positioned(Position),
    Exhausted,
}

/// A restartable, fail-fast position in a key range.
#[derive(Debug, Clone)]
pub struct Cursor {
    range: KeyRange,
    order: IterationOrder,
    state: CursorState,
    expected_modifications: u64,
}

impl Cursor {
    pub(crate) const fn new(range: KeyRange, order: IterationOrder, modifications: u64) -> Self {
        Self {
            range,
            order,
            state: CursorState::NotStarted,
            expected_modifications: modifications,
        }
    }

    /// The range this cursor walks.
    #[must_use]
    pub const fn range(&self) -> &KeyRange {
        &self.range
    }

    /// The direction this cursor walks.
    #[must_use]
    pub const fn order(&self) -> IterationOrder {
        self.order
    }

    /// Check whether the cursor is on an element.
    #[must_use]
    pub const fn is_positioned(&self) -> bool {
        matches!(self.state, CursorState::Positioned(_))
    }

    /// Advance to the next element in range.
    ///
    /// Returns `false` once the range is exhausted, and on every call after
    /// that.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ConcurrentModification`] if `tree` changed since
    /// the cursor was created or last reset.
    pub fn move_next<V>(&mut self, tree: &BTree<V>) -> Result<bool, IndexError> {
        self.check_modifications(tree.modification_count())?;

        let next = match (self.state, self.order) {
            (CursorState::Exhausted, _) => return Ok(false),
            (CursorState::NotStarted, IterationOrder::Ascending) => tree.seek_first(&self.range)?,
            (CursorState::NotStarted, IterationOrder::Descending) => tree.seek_last(&self.range)?,
            (CursorState::Positioned(pos), IterationOrder::Ascending) => tree.next_position(pos)?,
            (CursorState::Positioned(pos), IterationOrder::Descending) => tree.prev_position(pos)?,
        };

        let in_range = match next {
            Some(pos) => {
                let key = &tree.entry(pos)?.key;
                match self.order {
                    IterationOrder::Ascending => !self.range.is_above(tree.comparator(), key),
                    IterationOrder::Descending => !self.range.is_below(tree.comparator(), key),
                }
            }
            None => false,
        };

        self.state = match next {
            Some(pos) if in_range => CursorState::Positioned(pos),
            _ => CursorState::Exhausted,
        };
        Ok(in_range)
    }

    /// The entry the cursor is on.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidOperation`] before the first successful
    /// [`Cursor::move_next`] and after exhaustion, and
    /// [`IndexError::ConcurrentModification`] if `tree` changed.
    pub fn current<'t, V>(&self, tree: &'t BTree<V>) -> Result<&'t LeafEntry<V>, IndexError> {
        self.check_modifications(tree.modification_count())?;
        match self.state {
            CursorState::Positioned(pos) => tree.entry(pos),
            CursorState::NotStarted => Err(IndexError::InvalidOperation(
                "cursor has not been advanced",
            )),
            CursorState::Exhausted => Err(IndexError::InvalidOperation("cursor is exhausted")),
        }
    }

    /// Rewind to before the first element and accept the tree's current
    /// state.
    pub const fn reset<V>(&mut self, tree: &BTree<V>) {
        self.rewind(tree.modification_count());
    }

    /// Rewind to before the first element, expecting `modifications`.
    pub(crate) const fn rewind(&mut self, modifications: u64) {
        self.state = CursorState::NotStarted;
        self.expected_modifications = modifications;
    }

    pub(crate) const fn check_modifications(&self, modifications: u64) -> Result<(), IndexError> {
        if modifications == self.expected_modifications {
            Ok(())
        } else {
            Err(IndexError::ConcurrentModification)
        }
    }
}

/// Iterator over the entries of a borrowed tree.
///
/// Yields `Err` at most once, after which it is fused.
#[derive(Debug)]
pub struct Entries<'t, V> {
    tree: &'t BTree<V>,
    cursor: Cursor,
    failed: bool,
}

impl<'t, V> Entries<'t, V> {
    pub(crate) const fn new(tree: &'t BTree<V>, cursor: Cursor) -> Self {
        Self {
            tree,
            cursor,
            failed: false,
        }
    }
}

impl<'t, V> Iterator for Entries<'t, V> {
    type Item = Result<(&'t Key, &'t V), IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let step = self
            .cursor
            .move_next(self.tree)
            .and_then(|more| more.then(|| self.cursor.current(self.tree)).transpose());
        match step {
            Ok(Some(entry)) => Some(Ok((&entry.key, &entry.value))),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
