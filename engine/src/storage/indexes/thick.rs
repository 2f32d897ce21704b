//! Index for keys with many duplicates.
//!
//! A [`ThickIndex`] keeps one tree entry per distinct key. The entry holds
//! a bucket of objects: a small inline list while the key has few objects,
//! and a tree of its own, keyed by object identity, once the list grows
//! past the configured threshold. Buckets never shrink back to a list.

use crate::storage::btree::{BTree, Cursor, InsertMode, IterationOrder, KeyRange};
use crate::storage::error::IndexError;
use crate::storage::indexes::{IndexOptions, ObjectIndex, check_key, check_range, prefix_range};
use crate::types::{Key, KeyType, ObjectRef};

/// Objects stored under one key.
#[derive(Debug)]
enum Bucket {
    Inline(Vec<ObjectRef>),
    Tree(BTree<()>),
}

impl Bucket {
    fn len(&self) -> usize {
        match self {
            Self::Inline(objects) => objects.len(),
            Self::Tree(tree) => tree.len(),
        }
    }

    /// Add `obj`, upgrading to a tree when the list is full.
    ///
    /// Returns `true` if the bucket was upgraded.
    fn push(&mut self, obj: ObjectRef, threshold: usize, capacity: usize) -> Result<bool, IndexError> {
        match self {
            Self::Inline(objects) if objects.len() < threshold => {
                objects.push(obj);
                Ok(false)
            }
            Self::Inline(objects) => {
                let mut tree = BTree::with_capacity(capacity);
                for member in objects.iter().copied().chain(std::iter::once(obj)) {
                    tree.insert(Key::Object(member), (), InsertMode::Duplicate)?;
                }
                *self = Self::Tree(tree);
                Ok(true)
            }
            Self::Tree(tree) => {
                tree.insert(Key::Object(obj), (), InsertMode::Duplicate)?;
                Ok(false)
            }
        }
    }

    /// Remove one occurrence of `obj`, returning whether it was present.
    fn remove(&mut self, obj: ObjectRef) -> Result<bool, IndexError> {
        match self {
            Self::Inline(objects) => match objects.iter().position(|o| *o == obj) {
                Some(idx) => {
                    objects.remove(idx);
                    Ok(true)
                }
                None => Ok(false),
            },
            Self::Tree(tree) => Ok(tree.remove(&Key::Object(obj), |_| true)?.is_some()),
        }
    }

    fn contains(&self, obj: ObjectRef) -> Result<bool, IndexError> {
        match self {
            Self::Inline(objects) => Ok(objects.contains(&obj)),
            Self::Tree(tree) => Ok(tree.get(&Key::Object(obj))?.is_some()),
        }
    }

    /// The only object in the bucket.
    fn single(&self) -> Result<ObjectRef, IndexError> {
        if self.len() != 1 {
            return Err(IndexError::KeyNotUnique);
        }
        match self {
            Self::Inline(objects) => objects
                .first()
                .copied()
                .ok_or_else(|| IndexError::corrupt("empty inline bucket")),
            Self::Tree(tree) => tree
                .iter()
                .next()
                .transpose()?
                .and_then(|(key, _)| key.as_object())
                .ok_or_else(|| IndexError::corrupt("bucket tree holds a non-object key")),
        }
    }

    /// Replace the only object in the bucket.
    fn replace_single(&mut self, obj: ObjectRef) -> Result<ObjectRef, IndexError> {
        let previous = self.single()?;
        match self {
            Self::Inline(objects) => objects[0] = obj,
            Self::Tree(tree) => {
                tree.clear();
                tree.insert(Key::Object(obj), (), InsertMode::Duplicate)?;
            }
        }
        Ok(previous)
    }
}

/// A non-unique index grouping the objects of each key.
#[derive(Debug)]
pub struct ThickIndex {
    buckets: BTree<Bucket>,
    key_type: KeyType,
    len: usize,
    threshold: usize,
    node_capacity: usize,
    modifications: u64,
}

impl ThickIndex {
    /// Create an empty index with default options.
    #[must_use]
    pub fn new(key_type: KeyType) -> Self {
        Self::with_options(key_type, &IndexOptions::default())
    }

    /// Create an empty index.
    #[must_use]
    pub fn with_options(key_type: KeyType, options: &IndexOptions) -> Self {
        Self {
            buckets: BTree::with_capacity(options.node_capacity),
            key_type,
            len: 0,
            threshold: options.thick_threshold.max(1),
            node_capacity: options.node_capacity,
            modifications: 0,
        }
    }

    /// Number of distinct keys.
    #[must_use]
    pub const fn key_count(&self) -> usize {
        self.buckets.len()
    }

    /// Check whether the objects under `key` are held in a tree.
    pub fn is_upgraded(&self, key: &Key) -> Result<bool, IndexError> {
        Ok(matches!(self.buckets.get(key)?, Some(Bucket::Tree(_))))
    }

    /// Create a detached cursor over `range`.
    pub fn cursor(&self, range: KeyRange, order: IterationOrder) -> Result<ThickCursor, IndexError> {
        check_range(&self.key_type, &range)?;
        Ok(ThickCursor {
            outer: self.buckets.cursor(range, order),
            inner: Inner::Idle,
            order,
            expected_modifications: self.modifications,
        })
    }

    /// Iterate over every object in ascending key order.
    #[must_use]
    pub fn iter(&self) -> ThickIter<'_> {
        self.iter_range(KeyRange::all(), IterationOrder::Ascending)
    }

    /// Iterate over every object in descending key order.
    ///
    /// Objects sharing a key come out in exactly the reverse of [`ThickIndex::iter`].
    #[must_use]
    pub fn reverse(&self) -> ThickIter<'_> {
        self.iter_range(KeyRange::all(), IterationOrder::Descending)
    }

    /// Iterate over the objects with keys in `range`.
    pub fn range(&self, range: KeyRange, order: IterationOrder) -> Result<ThickIter<'_>, IndexError> {
        check_range(&self.key_type, &range)?;
        Ok(self.iter_range(range, order))
    }

    /// Iterate over the objects whose string key starts with `prefix`.
    pub fn starts_with(
        &self,
        prefix: &str,
        order: IterationOrder,
    ) -> Result<ThickIter<'_>, IndexError> {
        let range = prefix_range(&self.key_type, prefix)?;
        Ok(self.iter_range(range, order))
    }

    fn iter_range(&self, range: KeyRange, order: IterationOrder) -> ThickIter<'_> {
        ThickIter {
            index: self,
            cursor: ThickCursor {
                outer: self.buckets.cursor(range, order),
                inner: Inner::Idle,
                order,
                expected_modifications: self.modifications,
            },
            failed: false,
        }
    }

    fn collect_entries(&self, mut cursor: ThickCursor) -> Result<Vec<(Key, ObjectRef)>, IndexError> {
        let mut entries = Vec::with_capacity(self.len);
        while cursor.move_next(self)? {
            entries.push((cursor.current_key(self)?.clone(), cursor.current(self)?));
        }
        Ok(entries)
    }
}

impl ObjectIndex for ThickIndex {
    fn key_type(&self) -> &KeyType {
        &self.key_type
    }

    fn is_unique(&self) -> bool {
        false
    }

    fn len(&self) -> usize {
        self.len
    }

    fn put(&mut self, key: Key, obj: ObjectRef) -> Result<bool, IndexError> {
        check_key(&self.key_type, &key)?;
        let (threshold, capacity) = (self.threshold, self.node_capacity);
        match self.buckets.get_mut(&key)? {
            Some(bucket) => {
                if bucket.push(obj, threshold, capacity)? {
                    tracing::info!(
                        "Thick index bucket for key {} upgraded to a tree at {} objects",
                        key,
                        bucket.len()
                    );
                }
            }
            None => {
                self.buckets
                    .insert(key, Bucket::Inline(vec![obj]), InsertMode::Unique)?;
            }
        }
        self.len += 1;
        self.modifications += 1;
        Ok(true)
    }

    fn set(&mut self, key: Key, obj: ObjectRef) -> Result<Option<ObjectRef>, IndexError> {
        check_key(&self.key_type, &key)?;
        let previous = match self.buckets.get_mut(&key)? {
            Some(bucket) => Some(bucket.replace_single(obj)?),
            None => {
                self.buckets
                    .insert(key, Bucket::Inline(vec![obj]), InsertMode::Unique)?;
                self.len += 1;
                None
            }
        };
        self.modifications += 1;
        Ok(previous)
    }

    fn remove(&mut self, key: &Key, obj: ObjectRef) -> Result<(), IndexError> {
        check_key(&self.key_type, key)?;
        let Some(bucket) = self.buckets.get_mut(key)? else {
            return Err(IndexError::KeyNotFound);
        };
        if !bucket.remove(obj)? {
            return Err(IndexError::KeyNotFound);
        }
        if bucket.len() == 0 {
            self.buckets.remove(key, |_| true)?;
        }
        self.len -= 1;
        self.modifications += 1;
        Ok(())
    }

    fn remove_key(&mut self, key: &Key) -> Result<ObjectRef, IndexError> {
        check_key(&self.key_type, key)?;
        Err(IndexError::KeyNotUnique)
    }

    fn get(&self, key: &Key) -> Result<Option<ObjectRef>, IndexError> {
        check_key(&self.key_type, key)?;
        match self.buckets.get(key)? {
            Some(bucket) => bucket.single().map(Some),
            None => Ok(None),
        }
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
        match self.buckets.get(key)? {
            Some(bucket) => bucket.contains(obj),
            None => Ok(false),
        }
    }

    fn entries(&self, order: IterationOrder) -> Result<Vec<(Key, ObjectRef)>, IndexError> {
        self.collect_entries(self.cursor(KeyRange::all(), order)?)
    }

    fn to_vec(&self) -> Result<Vec<ObjectRef>, IndexError> {
        self.iter().collect()
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
        self.modifications += 1;
    }

    fn modification_count(&self) -> u64 {
        self.modifications
    }

    fn validate(&self) -> Result<(), IndexError> {
        self.buckets.validate()?;
        let mut total = 0;
        for entry in self.buckets.iter() {
            let (key, bucket) = entry?;
            if bucket.len() == 0 {
                return Err(IndexError::corrupt(format!("empty bucket under key {key}")));
            }
            if let Bucket::Tree(tree) = bucket {
                tree.validate()?;
            }
            total += bucket.len();
        }
        if total != self.len {
            return Err(IndexError::corrupt(format!(
                "buckets hold {total} objects but index records {}",
                self.len
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Inner {
    /// Not inside a bucket.
    Idle,
    Inline { slot: Option<usize> },
    Tree(Cursor),
}

/// A detached, fail-fast cursor over a [`ThickIndex`].
#[derive(Debug, Clone)]
pub struct ThickCursor {
    outer: Cursor,
    inner: Inner,
    order: IterationOrder,
    expected_modifications: u64,
}

impl ThickCursor {
    /// Advance to the next object in range.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ConcurrentModification`] if the index changed
    /// since the cursor was created or last reset.
    pub fn move_next(&mut self, index: &ThickIndex) -> Result<bool, IndexError> {
        self.check_modifications(index)?;
        loop {
            if self.advance_inner(index)? {
                return Ok(true);
            }
            if !self.outer.move_next(&index.buckets)? {
                return Ok(false);
            }
            self.inner = match &self.outer.current(&index.buckets)?.value {
                Bucket::Inline(_) => Inner::Inline { slot: None },
                Bucket::Tree(tree) => Inner::Tree(tree.cursor(KeyRange::all(), self.order)),
            };
        }
    }

    fn advance_inner(&mut self, index: &ThickIndex) -> Result<bool, IndexError> {
        if matches!(self.inner, Inner::Idle) {
            return Ok(false);
        }
        let bucket = &self.outer.current(&index.buckets)?.value;
        let advanced = match (&mut self.inner, bucket) {
            (Inner::Inline { slot }, Bucket::Inline(objects)) => {
                let next = match (self.order, *slot) {
                    (IterationOrder::Ascending, None) => Some(0),
                    (IterationOrder::Ascending, Some(s)) => Some(s + 1),
                    (IterationOrder::Descending, None) => objects.len().checked_sub(1),
                    (IterationOrder::Descending, Some(s)) => s.checked_sub(1),
                };
                match next.filter(|&n| n < objects.len()) {
                    Some(n) => {
                        *slot = Some(n);
                        true
                    }
                    None => false,
                }
            }
            (Inner::Tree(cursor), Bucket::Tree(tree)) => cursor.move_next(tree)?,
            _ => return Err(IndexError::corrupt("bucket changed shape under a cursor")),
        };
        if !advanced {
            self.inner = Inner::Idle;
        }
        Ok(advanced)
    }

    /// The object the cursor is on.
    pub fn current(&self, index: &ThickIndex) -> Result<ObjectRef, IndexError> {
        self.check_modifications(index)?;
        match &self.inner {
            Inner::Idle => Err(IndexError::InvalidOperation("cursor is not on an element")),
            Inner::Inline { slot } => {
                let Bucket::Inline(objects) = &self.outer.current(&index.buckets)?.value else {
                    return Err(IndexError::corrupt("bucket changed shape under a cursor"));
                };
                slot.and_then(|s| objects.get(s).copied())
                    .ok_or(IndexError::InvalidOperation("cursor is not on an element"))
            }
            Inner::Tree(cursor) => {
                let Bucket::Tree(tree) = &self.outer.current(&index.buckets)?.value else {
                    return Err(IndexError::corrupt("bucket changed shape under a cursor"));
                };
                cursor
                    .current(tree)?
                    .key
                    .as_object()
                    .ok_or_else(|| IndexError::corrupt("bucket tree holds a non-object key"))
            }
        }
    }

    /// The key of the object the cursor is on.
    pub fn current_key<'a>(&self, index: &'a ThickIndex) -> Result<&'a Key, IndexError> {
        self.check_modifications(index)?;
        if matches!(self.inner, Inner::Idle) {
            return Err(IndexError::InvalidOperation("cursor is not on an element"));
        }
        Ok(&self.outer.current(&index.buckets)?.key)
    }

    /// Rewind and accept the index's current state.
    pub fn reset(&mut self, index: &ThickIndex) {
        self.outer.reset(&index.buckets);
        self.inner = Inner::Idle;
        self.expected_modifications = index.modifications;
    }

    const fn check_modifications(&self, index: &ThickIndex) -> Result<(), IndexError> {
        if index.modifications == self.expected_modifications {
            Ok(())
        } else {
            Err(IndexError::ConcurrentModification)
        }
    }
}

/// Iterator over the objects of a borrowed [`ThickIndex`].
#[derive(Debug)]
pub struct ThickIter<'a> {
    index: &'a ThickIndex,
    cursor: ThickCursor,
    failed: bool,
}

impl Iterator for ThickIter<'_> {
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
