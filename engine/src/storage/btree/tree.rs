//! In-memory B+tree over [`Key`]s.
//!
//! The tree stores `(key, value)` entries in linked leaves and keeps every
//! leaf at the same depth. Nodes hold at most `capacity` children (or
//! entries); non-root nodes hold at least half of that. Inserting into a
//! full node splits it and promotes a separator, removing from a node at
//! minimum fill borrows from or merges with a sibling, and the root
//! collapses when it is left with a single child.
//!
//! Every structural change bumps a modification counter that cursors use to
//! detect that the tree changed under them.

use crate::storage::btree::comparator::Comparator;
use crate::storage::btree::cursor::{Cursor, Entries, IterationOrder, KeyRange};
use crate::storage::btree::node::{
    DEFAULT_NODE_CAPACITY, InternalNode, LeafEntry, LeafNode, MIN_NODE_CAPACITY, Node, NodeArena,
    NodeId,
};
use crate::storage::error::IndexError;
use crate::types::Key;

/// How [`BTree::insert`] treats an existing entry with an equal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Leave the tree unchanged if the key exists.
    Unique,
    /// Store the entry after any existing entries with an equal key.
    Duplicate,
    /// Replace the value of the first entry with an equal key.
    Overwrite,
}

/// Result of [`BTree::insert`].
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome<V> {
    /// A new entry was stored.
    Inserted,
    /// An equal key exists and the tree is unchanged.
    Duplicate,
    /// An equal key existed; its previous value is returned.
    Replaced(V),
}

/// Location of an entry inside a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub(crate) leaf: NodeId,
    pub(crate) slot: usize,
}

enum Removal<V> {
    NotFound,
    Removed { value: V, underflow: bool },
}

/// A B+tree with a pluggable key comparator.
///
/// # Invariants
///
/// - The root always exists; an empty tree has an empty leaf root.
/// - All leaves are at depth `height`.
/// - Leaf entries are sorted by the comparator; equal keys keep insertion
///   order.
/// - Internal nodes other than the root have between `ceil(capacity / 2)`
///   and `capacity` children; the root has at least two.
/// - Leaves other than the root have between `capacity / 2` and `capacity`
///   entries.
#[derive(Debug)]
pub struct BTree<V> {
    nodes: NodeArena<V>,
    root: NodeId,
    height: usize,
    len: usize,
    capacity: usize,
    comparator: Comparator,
    modifications: u64,
}

impl<V> BTree<V> {
    /// Create an empty tree with the default capacity and natural key order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(DEFAULT_NODE_CAPACITY, Comparator::default())
    }

    /// Create an empty tree with the given node capacity.
    ///
    /// Capacities below [`MIN_NODE_CAPACITY`] are raised to it.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_comparator(capacity, Comparator::default())
    }

    /// Create an empty tree with the given node capacity and comparator.
    #[must_use]
    pub fn with_comparator(capacity: usize, comparator: Comparator) -> Self {
        let mut nodes = NodeArena::new();
        let root = nodes.allocate(Node::Leaf(LeafNode::new()));
        Self {
            nodes,
            root,
            height: 1,
            len: 0,
            capacity: capacity.max(MIN_NODE_CAPACITY),
            comparator,
            modifications: 0,
        }
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels, counting the leaf level.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Maximum fan-out of a node.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of modifications since the tree was created.
    #[must_use]
    pub const fn modification_count(&self) -> u64 {
        self.modifications
    }

    /// The comparator ordering this tree.
    #[must_use]
    pub const fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    const fn min_leaf_entries(&self) -> usize {
        self.capacity / 2
    }

    const fn min_children(&self) -> usize {
        self.capacity.div_ceil(2)
    }

    /// Insert an entry.
    ///
    /// With [`InsertMode::Duplicate`] the entry goes after every entry with an
    /// equal key, so duplicates are returned in insertion order.
    pub fn insert(
        &mut self,
        key: Key,
        value: V,
        mode: InsertMode,
    ) -> Result<InsertOutcome<V>, IndexError> {
        if mode != InsertMode::Duplicate {
            let comparator = self.comparator;
            let existing = match self.seek_forward(|k| comparator.entries(k, &key).is_lt())? {
                Some(pos) if comparator.entries(&self.entry(pos)?.key, &key).is_eq() => Some(pos),
                _ => None,
            };
            if let Some(pos) = existing {
                if mode == InsertMode::Unique {
                    return Ok(InsertOutcome::Duplicate);
                }
                let entry = self.entry_mut(pos)?;
                let previous = std::mem::replace(&mut entry.value, value);
                self.modifications += 1;
                return Ok(InsertOutcome::Replaced(previous));
            }
        }

        if let Some((separator, right)) = self.insert_into(self.root, key, value)? {
            let old_root = self.root;
            self.root = self.nodes.allocate(Node::Internal(InternalNode::with_children(
                old_root, separator, right,
            )));
            self.height += 1;
            tracing::debug!("B+tree root split, height now {}", self.height);
        }
        self.len += 1;
        self.modifications += 1;
        Ok(InsertOutcome::Inserted)
    }

    /// Insert below `id`, returning the separator and new right sibling if
    /// `id` split.
    fn insert_into(
        &mut self,
        id: NodeId,
        key: Key,
        value: V,
    ) -> Result<Option<(Key, NodeId)>, IndexError> {
        let comparator = self.comparator;
        let capacity = self.capacity;

        let (idx, child) = match self.nodes.get_mut(id)? {
            Node::Leaf(leaf) => {
                let slot = leaf
                    .entries
                    .partition_point(|e| comparator.entries(&e.key, &key).is_le());
                leaf.entries.insert(slot, LeafEntry { key, value });
                let overflow = leaf.len() > capacity;
                return if overflow {
                    self.split_leaf(id).map(Some)
                } else {
                    Ok(None)
                };
            }
            Node::Internal(node) => {
                let idx = node
                    .keys
                    .partition_point(|k| comparator.entries(k, &key).is_le());
                (idx, node.child(idx)?)
            }
        };

        let Some((separator, right)) = self.insert_into(child, key, value)? else {
            return Ok(None);
        };

        let node = self.nodes.internal_mut(id)?;
        node.insert_child(idx, separator, right);
        if node.children.len() <= capacity {
            return Ok(None);
        }
        let (median, right_node) = node.split();
        let right_id = self.nodes.allocate(Node::Internal(right_node));
        Ok(Some((median, right_id)))
    }

    /// Split an overflowing leaf and link the new right half in.
    fn split_leaf(&mut self, id: NodeId) -> Result<(Key, NodeId), IndexError> {
        let leaf = self.nodes.leaf_mut(id)?;
        let mut right = leaf.split();
        let separator = right
            .entries
            .first()
            .map(|entry| entry.key.clone())
            .ok_or_else(|| IndexError::corrupt(format!("split of {id} produced an empty leaf")))?;
        let old_next = leaf.next_leaf;
        right.prev_leaf = Some(id);
        right.next_leaf = old_next;

        let right_id = self.nodes.allocate(Node::Leaf(right));
        self.nodes.leaf_mut(id)?.next_leaf = Some(right_id);
        if let Some(next) = old_next {
            self.nodes.leaf_mut(next)?.prev_leaf = Some(right_id);
        }
        Ok((separator, right_id))
    }

    /// Remove the first entry with a key equal to `key` whose value satisfies
    /// `matches`.
    ///
    /// Returns the removed value, or `None` if no entry matched.
    pub fn remove(
        &mut self,
        key: &Key,
        mut matches: impl FnMut(&V) -> bool,
    ) -> Result<Option<V>, IndexError> {
        match self.remove_from(self.root, key, &mut matches)? {
            Removal::NotFound => Ok(None),
            Removal::Removed { value, .. } => {
                self.len -= 1;
                self.modifications += 1;
                self.collapse_root()?;
                Ok(Some(value))
            }
        }
    }

    fn remove_from(
        &mut self,
        id: NodeId,
        key: &Key,
        matches: &mut dyn FnMut(&V) -> bool,
    ) -> Result<Removal<V>, IndexError> {
        let comparator = self.comparator;
        let min_entries = self.min_leaf_entries();

        let start = match self.nodes.get_mut(id)? {
            Node::Leaf(leaf) => {
                let mut slot = leaf
                    .entries
                    .partition_point(|e| comparator.entry_with_key(&e.key, key).is_lt());
                while slot < leaf.len() {
                    let entry = &leaf.entries[slot];
                    if comparator.entry_with_key(&entry.key, key).is_ne() {
                        break;
                    }
                    if matches(&entry.value) {
                        let removed = leaf.entries.remove(slot);
                        return Ok(Removal::Removed {
                            value: removed.value,
                            underflow: leaf.len() < min_entries,
                        });
                    }
                    slot += 1;
                }
                return Ok(Removal::NotFound);
            }
            Node::Internal(node) => node
                .keys
                .partition_point(|k| comparator.entry_with_key(k, key).is_lt()),
        };

        // Equal keys may span several children; try each in turn.
        let mut idx = start;
        loop {
            let child = {
                let node = self.nodes.internal(id)?;
                if idx >= node.children.len()
                    || (idx > start && comparator.entry_with_key(node.key(idx - 1)?, key).is_gt())
                {
                    return Ok(Removal::NotFound);
                }
                node.child(idx)?
            };

            if let Removal::Removed { value, underflow } = self.remove_from(child, key, matches)? {
                if underflow {
                    self.rebalance(id, idx)?;
                }
                let underflow = self.nodes.internal(id)?.children.len() < self.min_children();
                return Ok(Removal::Removed { value, underflow });
            }
            idx += 1;
        }
    }

    /// Restore minimum fill of `parent.children[idx]` by borrowing from or
    /// merging with an adjacent sibling.
    fn rebalance(&mut self, parent_id: NodeId, idx: usize) -> Result<(), IndexError> {
        let capacity = self.capacity;
        let (left_idx, left_id, right_id) = {
            let parent = self.nodes.internal(parent_id)?;
            let count = parent.children.len();
            if count < 2 {
                return Ok(());
            }
            let left_idx = if idx + 1 < count { idx } else { idx - 1 };
            (left_idx, parent.child(left_idx)?, parent.child(left_idx + 1)?)
        };

        let left = self.nodes.take(left_id)?;
        let right = self.nodes.take(right_id)?;
        match (left, right) {
            (Node::Leaf(mut left), Node::Leaf(mut right)) => {
                if left.len() + right.len() <= capacity {
                    left.entries.append(&mut right.entries);
                    left.next_leaf = right.next_leaf;
                    if let Some(next) = right.next_leaf {
                        self.nodes.leaf_mut(next)?.prev_leaf = Some(left_id);
                    }
                    self.nodes.restore(left_id, Node::Leaf(left));
                    self.nodes.restore(right_id, Node::Leaf(right));
                    self.nodes.release(right_id)?;
                    self.nodes.internal_mut(parent_id)?.remove_child(left_idx)?;
                } else {
                    balance_leaves(&mut left, &mut right);
                    let separator = right.entries.first().map(|entry| entry.key.clone());
                    self.nodes.restore(left_id, Node::Leaf(left));
                    self.nodes.restore(right_id, Node::Leaf(right));
                    if let Some(separator) = separator {
                        *self.nodes.internal_mut(parent_id)?.key_mut(left_idx)? = separator;
                    }
                }
            }
            (Node::Internal(mut left), Node::Internal(mut right)) => {
                let merge = left.children.len() + right.children.len() <= capacity;
                let step = self.nodes.internal_mut(parent_id).and_then(|parent| {
                    if merge {
                        let separator = parent.remove_child(left_idx)?;
                        left.keys.push(separator);
                        left.keys.append(&mut right.keys);
                        left.children.append(&mut right.children);
                    } else {
                        rotate_internal(&mut left, &mut right, parent.key_mut(left_idx)?);
                    }
                    Ok(())
                });
                // Both siblings go back into the arena even when the parent
                // is damaged.
                self.nodes.restore(left_id, Node::Internal(left));
                self.nodes.restore(right_id, Node::Internal(right));
                step?;
                if merge {
                    self.nodes.release(right_id)?;
                }
            }
            (left, right) => {
                self.nodes.restore(left_id, left);
                self.nodes.restore(right_id, right);
                return Err(IndexError::corrupt(format!(
                    "siblings {left_id} and {right_id} are at different depths"
                )));
            }
        }
        Ok(())
    }

    fn collapse_root(&mut self) -> Result<(), IndexError> {
        loop {
            let only_child = match self.nodes.get(self.root)? {
                Node::Internal(node) if node.children.len() == 1 => node.child(0)?,
                _ => return Ok(()),
            };
            self.nodes.release(self.root)?;
            self.root = only_child;
            self.height -= 1;
            tracing::debug!("B+tree root collapsed, height now {}", self.height);
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.allocate(Node::Leaf(LeafNode::new()));
        self.height = 1;
        self.len = 0;
        self.modifications += 1;
    }

    /// Value of the first entry whose key equals `key`.
    pub fn get(&self, key: &Key) -> Result<Option<&V>, IndexError> {
        match self.find_equal(key)? {
            Some(pos) => Ok(Some(&self.entry(pos)?.value)),
            None => Ok(None),
        }
    }

    /// Mutable value of the first entry whose key equals `key`.
    ///
    /// Editing a value in place is not a structural change and does not
    /// invalidate cursors.
    pub fn get_mut(&mut self, key: &Key) -> Result<Option<&mut V>, IndexError> {
        match self.find_equal(key)? {
            Some(pos) => Ok(Some(&mut self.entry_mut(pos)?.value)),
            None => Ok(None),
        }
    }

    /// Count entries whose key equals `key`, stopping at `limit`.
    pub fn count_equal(&self, key: &Key, limit: usize) -> Result<usize, IndexError> {
        let mut count = 0;
        let mut pos = self.find_equal(key)?;
        while let Some(current) = pos {
            if count == limit || self.comparator.entry_with_key(&self.entry(current)?.key, key).is_ne()
            {
                break;
            }
            count += 1;
            pos = self.next_position(current)?;
        }
        Ok(count)
    }

    /// Check whether an entry with key `key` satisfies `matches`.
    pub fn contains(&self, key: &Key, matches: impl Fn(&V) -> bool) -> Result<bool, IndexError> {
        let mut pos = self.find_equal(key)?;
        while let Some(current) = pos {
            let entry = self.entry(current)?;
            if self.comparator.entry_with_key(&entry.key, key).is_ne() {
                break;
            }
            if matches(&entry.value) {
                return Ok(true);
            }
            pos = self.next_position(current)?;
        }
        Ok(false)
    }

    fn find_equal(&self, key: &Key) -> Result<Option<Position>, IndexError> {
        let comparator = self.comparator;
        let Some(pos) = self.seek_forward(|k| comparator.entry_with_key(k, key).is_lt())? else {
            return Ok(None);
        };
        if comparator.entry_with_key(&self.entry(pos)?.key, key).is_eq() {
            Ok(Some(pos))
        } else {
            Ok(None)
        }
    }

    /// Create a detached cursor over `range`.
    #[must_use]
    pub const fn cursor(&self, range: KeyRange, order: IterationOrder) -> Cursor {
        Cursor::new(range, order, self.modifications)
    }

    /// Iterate over all entries in ascending order.
    #[must_use]
    pub const fn iter(&self) -> Entries<'_, V> {
        Entries::new(self, self.cursor(KeyRange::all(), IterationOrder::Ascending))
    }

    /// Iterate over the entries in `range`.
    #[must_use]
    pub const fn range(&self, range: KeyRange, order: IterationOrder) -> Entries<'_, V> {
        Entries::new(self, self.cursor(range, order))
    }

    /// First position inside `range`'s lower bound.
    pub(crate) fn seek_first(&self, range: &KeyRange) -> Result<Option<Position>, IndexError> {
        self.seek_forward(|k| range.is_below(&self.comparator, k))
    }

    /// Last position inside `range`'s upper bound.
    pub(crate) fn seek_last(&self, range: &KeyRange) -> Result<Option<Position>, IndexError> {
        self.seek_backward(|k| range.is_above(&self.comparator, k))
    }

    /// First entry for which `before` is false.
    ///
    /// `before` must be true for a (possibly empty) prefix of the key order
    /// and false afterwards.
    fn seek_forward(&self, before: impl Fn(&Key) -> bool) -> Result<Option<Position>, IndexError> {
        let mut id = self.root;
        while let Node::Internal(node) = self.nodes.get(id)? {
            let idx = node.keys.partition_point(|k| before(k));
            id = node.child(idx)?;
        }

        let mut current = Some(id);
        while let Some(leaf_id) = current {
            let leaf = self.nodes.leaf(leaf_id)?;
            let slot = leaf.entries.partition_point(|e| before(&e.key));
            if slot < leaf.len() {
                return Ok(Some(Position {
                    leaf: leaf_id,
                    slot,
                }));
            }
            current = leaf.next_leaf;
        }
        Ok(None)
    }

    /// Last entry for which `after` is false.
    ///
    /// `after` must be false for a (possibly empty) prefix of the key order
    /// and true afterwards.
    fn seek_backward(&self, after: impl Fn(&Key) -> bool) -> Result<Option<Position>, IndexError> {
        let mut id = self.root;
        while let Node::Internal(node) = self.nodes.get(id)? {
            let idx = node.keys.partition_point(|k| !after(k));
            id = node.child(idx)?;
        }

        let mut current = Some(id);
        while let Some(leaf_id) = current {
            let leaf = self.nodes.leaf(leaf_id)?;
            let count = leaf.entries.partition_point(|e| !after(&e.key));
            if count > 0 {
                return Ok(Some(Position {
                    leaf: leaf_id,
                    slot: count - 1,
                }));
            }
            current = leaf.prev_leaf;
        }
        Ok(None)
    }

    /// Position following `pos` in key order.
    pub(crate) fn next_position(&self, pos: Position) -> Result<Option<Position>, IndexError> {
        let leaf = self.nodes.leaf(pos.leaf)?;
        if pos.slot + 1 < leaf.len() {
            return Ok(Some(Position {
                leaf: pos.leaf,
                slot: pos.slot + 1,
            }));
        }
        let mut next = leaf.next_leaf;
        while let Some(id) = next {
            let leaf = self.nodes.leaf(id)?;
            if !leaf.is_empty() {
                return Ok(Some(Position { leaf: id, slot: 0 }));
            }
            next = leaf.next_leaf;
        }
        Ok(None)
    }

    /// Position preceding `pos` in key order.
    pub(crate) fn prev_position(&self, pos: Position) -> Result<Option<Position>, IndexError> {
        if pos.slot > 0 {
            return Ok(Some(Position {
                leaf: pos.leaf,
                slot: pos.slot - 1,
            }));
        }
        let mut prev = self.nodes.leaf(pos.leaf)?.prev_leaf;
        while let Some(id) = prev {
            let leaf = self.nodes.leaf(id)?;
            if let Some(slot) = leaf.len().checked_sub(1) {
                return Ok(Some(Position { leaf: id, slot }));
            }
            prev = leaf.prev_leaf;
        }
        Ok(None)
    }

    /// Entry at `pos`.
    pub(crate) fn entry(&self, pos: Position) -> Result<&LeafEntry<V>, IndexError> {
        self.nodes
            .leaf(pos.leaf)?
            .entries
            .get(pos.slot)
            .ok_or_else(|| IndexError::corrupt(format!("{} has no slot {}", pos.leaf, pos.slot)))
    }

    fn entry_mut(&mut self, pos: Position) -> Result<&mut LeafEntry<V>, IndexError> {
        self.nodes
            .leaf_mut(pos.leaf)?
            .entries
            .get_mut(pos.slot)
            .ok_or_else(|| IndexError::corrupt(format!("{} has no slot {}", pos.leaf, pos.slot)))
    }

    /// Check every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::CorruptIndex`] describing the first violation
    /// found.
    pub fn validate(&self) -> Result<(), IndexError> {
        let mut leaves = Vec::new();
        let mut visited = 0;
        let count = self.validate_node(self.root, 1, (None, None), &mut leaves, &mut visited)?;
        if count != self.len {
            return Err(IndexError::corrupt(format!(
                "tree holds {count} entries but records {}",
                self.len
            )));
        }
        if visited != self.nodes.live() {
            return Err(IndexError::corrupt(format!(
                "{} live nodes but only {visited} reachable",
                self.nodes.live()
            )));
        }
        for (i, &leaf_id) in leaves.iter().enumerate() {
            let leaf = self.nodes.leaf(leaf_id)?;
            let prev = i.checked_sub(1).map(|p| leaves[p]);
            let next = leaves.get(i + 1).copied();
            if leaf.prev_leaf != prev || leaf.next_leaf != next {
                return Err(IndexError::corrupt(format!("{leaf_id} has broken sibling links")));
            }
        }
        Ok(())
    }

    fn validate_node(
        &self,
        id: NodeId,
        depth: usize,
        bounds: (Option<&Key>, Option<&Key>),
        leaves: &mut Vec<NodeId>,
        visited: &mut usize,
    ) -> Result<usize, IndexError> {
        *visited += 1;
        let is_root = id == self.root;
        let in_bounds = |key: &Key| {
            bounds.0.is_none_or(|low| self.comparator.entries(low, key).is_le())
                && bounds.1.is_none_or(|high| self.comparator.entries(key, high).is_le())
        };
        let sorted = |a: &Key, b: &Key| self.comparator.entries(a, b).is_le();

        match self.nodes.get(id)? {
            Node::Leaf(leaf) => {
                if depth != self.height {
                    return Err(IndexError::corrupt(format!(
                        "{id} is a leaf at depth {depth}, expected {}",
                        self.height
                    )));
                }
                if leaf.len() > self.capacity || (!is_root && leaf.len() < self.min_leaf_entries())
                {
                    return Err(IndexError::corrupt(format!(
                        "{id} holds {} entries",
                        leaf.len()
                    )));
                }
                if !leaf.entries.windows(2).all(|w| sorted(&w[0].key, &w[1].key)) {
                    return Err(IndexError::corrupt(format!("{id} entries are out of order")));
                }
                if !leaf.entries.iter().all(|e| in_bounds(&e.key)) {
                    return Err(IndexError::corrupt(format!(
                        "{id} holds a key outside its separators"
                    )));
                }
                leaves.push(id);
                Ok(leaf.len())
            }
            Node::Internal(node) => {
                let children = node.children.len();
                let min = if is_root { 2 } else { self.min_children() };
                if node.keys.len() + 1 != children || children < min || children > self.capacity {
                    return Err(IndexError::corrupt(format!(
                        "{id} has {} keys and {children} children",
                        node.keys.len()
                    )));
                }
                if !node.keys.windows(2).all(|w| sorted(&w[0], &w[1]))
                    || !node.keys.iter().all(|k| in_bounds(k))
                {
                    return Err(IndexError::corrupt(format!("{id} separators are out of order")));
                }
                let mut total = 0;
                for (i, &child) in node.children.iter().enumerate() {
                    let low = i.checked_sub(1).map_or(bounds.0, |p| node.keys.get(p));
                    let high = node.keys.get(i).or(bounds.1);
                    total += self.validate_node(child, depth + 1, (low, high), leaves, visited)?;
                }
                Ok(total)
            }
        }
    }
}

impl<V> Default for BTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Even out entry counts between two adjacent leaves.
fn balance_leaves<V>(left: &mut LeafNode<V>, right: &mut LeafNode<V>) {
    let target = (left.len() + right.len()) / 2;
    if left.len() < target {
        let take = target - left.len();
        left.entries.extend(right.entries.drain(..take));
    } else if left.len() > target {
        let mut moved = left.entries.split_off(target);
        moved.append(&mut right.entries);
        right.entries = moved;
    }
}

/// Even out child counts between two adjacent internal nodes, rotating keys
/// through the parent separator.
fn rotate_internal(left: &mut InternalNode, right: &mut InternalNode, separator: &mut Key) {
    let target = (left.children.len() + right.children.len()) / 2;
    if left.children.len() < target {
        let take = target - left.children.len();
        let mut moved_keys: Vec<Key> = right.keys.drain(..take).collect();
        if let Some(new_separator) = moved_keys.pop() {
            left.keys.push(std::mem::replace(separator, new_separator));
            left.keys.append(&mut moved_keys);
            left.children.extend(right.children.drain(..take));
        }
    } else if left.children.len() > target {
        let take = left.children.len() - target;
        let mut moved_keys = left.keys.split_off(left.keys.len() - take);
        let mut moved_children = left.children.split_off(left.children.len() - take);
        let new_separator = moved_keys.remove(0);
        moved_keys.push(std::mem::replace(separator, new_separator));
        moved_keys.append(&mut right.keys);
        right.keys = moved_keys;
        moved_children.append(&mut right.children);
        right.children = moved_children;
    }
}
