//! B+tree node types and the node arena.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Internal
//! nodes hold separator keys and child ids; leaf nodes hold entries and
//! are doubly linked so range scans can walk sideways without revisiting
//! internal nodes.

use crate::storage::error::IndexError;
use crate::types::Key;

/// Default maximum fan-out of a node.
pub const DEFAULT_NODE_CAPACITY: usize = 64;

/// Smallest fan-out that still allows a split to produce two legal nodes.
pub const MIN_NODE_CAPACITY: usize = 4;

/// Identifier of a node slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// An internal node.
///
/// `children[i]` holds keys `>= keys[i - 1]` and `<= keys[i]`; equal keys
/// may sit on both sides of a separator when duplicates are stored.
///
/// # Invariants
///
/// - `children.len() == keys.len() + 1`.
/// - `keys` is sorted.
#[derive(Debug)]
pub struct InternalNode {
    pub keys: Vec<Key>,
    pub children: Vec<NodeId>,
}

impl InternalNode {
    /// Create a root over two children.
    #[must_use]
    pub fn with_children(left: NodeId, key: Key, right: NodeId) -> Self {
        Self {
            keys: vec![key],
            children: vec![left, right],
        }
    }

    /// Insert a separator and the child to its right at `idx`.
    pub fn insert_child(&mut self, idx: usize, key: Key, right: NodeId) {
        self.keys.insert(idx, key);
        self.children.insert(idx + 1, right);
    }

    /// Child at `idx`, or [`IndexError::CorruptIndex`] if there is none.
    pub fn child(&self, idx: usize) -> Result<NodeId, IndexError> {
        self.children
            .get(idx)
            .copied()
            .ok_or_else(|| IndexError::corrupt(format!("internal node has no child {idx}")))
    }

    /// Separator at `idx`, or [`IndexError::CorruptIndex`] if there is none.
    pub fn key(&self, idx: usize) -> Result<&Key, IndexError> {
        self.keys
            .get(idx)
            .ok_or_else(|| IndexError::corrupt(format!("internal node has no separator {idx}")))
    }

    /// Mutable separator at `idx`.
    pub fn key_mut(&mut self, idx: usize) -> Result<&mut Key, IndexError> {
        self.keys
            .get_mut(idx)
            .ok_or_else(|| IndexError::corrupt(format!("internal node has no separator {idx}")))
    }

    /// Remove the separator at `idx` and the child to its right.
    pub fn remove_child(&mut self, idx: usize) -> Result<Key, IndexError> {
        if idx + 1 >= self.children.len() || idx >= self.keys.len() {
            return Err(IndexError::corrupt(format!(
                "internal node has no separator {idx} to remove"
            )));
        }
        self.children.remove(idx + 1);
        Ok(self.keys.remove(idx))
    }

    /// Split the node, returning the promoted median key and the new right
    /// node.
    #[must_use]
    pub fn split(&mut self) -> (Key, Self) {
        let mid = self.keys.len() / 2;
        let right_keys = self.keys.split_off(mid + 1);
        let right_children = self.children.split_off(mid + 1);
        let median = self.keys.remove(mid);
        (
            median,
            Self {
                keys: right_keys,
                children: right_children,
            },
        )
    }
}

/// A key-value entry in a leaf node.
#[derive(Debug)]
pub struct LeafEntry<V> {
    pub key: Key,
    pub value: V,
}

/// A leaf node.
#[derive(Debug)]
pub struct LeafNode<V> {
    /// Entries sorted by key; duplicates keep insertion order.
    pub entries: Vec<LeafEntry<V>>,
    pub prev_leaf: Option<NodeId>,
    pub next_leaf: Option<NodeId>,
}

impl<V> LeafNode<V> {
    /// Create an empty unlinked leaf.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            prev_leaf: None,
            next_leaf: None,
        }
    }

    /// Number of entries.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len() is not const-stable
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the leaf holds no entries.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move the upper half of the entries into a new unlinked leaf.
    ///
    /// The separator for the parent is the first key of the returned leaf.
    #[must_use]
    pub fn split(&mut self) -> Self {
        let mid = self.entries.len().div_ceil(2);
        Self {
            entries: self.entries.split_off(mid),
            prev_leaf: None,
            next_leaf: None,
        }
    }
}

impl<V> Default for LeafNode<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A tree node.
#[derive(Debug)]
pub enum Node<V> {
    Internal(InternalNode),
    Leaf(LeafNode<V>),
}

/// Slot storage for tree nodes with id reuse.
#[derive(Debug)]
pub struct NodeArena<V> {
    slots: Vec<Option<Node<V>>>,
    free: Vec<NodeId>,
}

impl<V> NodeArena<V> {
    /// Create an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store a node and return its id.
    pub fn allocate(&mut self, node: Node<V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    /// Remove a node permanently and recycle its id.
    pub fn release(&mut self, id: NodeId) -> Result<Node<V>, IndexError> {
        let node = self.take(id)?;
        self.free.push(id);
        Ok(node)
    }

    /// Move a node out of its slot so it can be edited alongside others.
    ///
    /// The node must be returned with [`NodeArena::restore`].
    pub fn take(&mut self, id: NodeId) -> Result<Node<V>, IndexError> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or_else(|| IndexError::corrupt(format!("{id} is missing")))
    }

    /// Put a node taken with [`NodeArena::take`] back into its slot.
    pub fn restore(&mut self, id: NodeId, node: Node<V>) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            *slot = Some(node);
        }
    }

    /// Borrow a node.
    pub fn get(&self, id: NodeId) -> Result<&Node<V>, IndexError> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| IndexError::corrupt(format!("{id} is missing")))
    }

    /// Borrow a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node<V>, IndexError> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| IndexError::corrupt(format!("{id} is missing")))
    }

    /// Borrow a node that must be a leaf.
    pub fn leaf(&self, id: NodeId) -> Result<&LeafNode<V>, IndexError> {
        match self.get(id)? {
            Node::Leaf(leaf) => Ok(leaf),
            Node::Internal(_) => Err(IndexError::corrupt(format!("{id} is not a leaf"))),
        }
    }

    /// Borrow a node that must be a leaf, mutably.
    pub fn leaf_mut(&mut self, id: NodeId) -> Result<&mut LeafNode<V>, IndexError> {
        match self.get_mut(id)? {
            Node::Leaf(leaf) => Ok(leaf),
            Node::Internal(_) => Err(IndexError::corrupt(format!("{id} is not a leaf"))),
        }
    }

    /// Borrow a node that must be internal.
    pub fn internal(&self, id: NodeId) -> Result<&InternalNode, IndexError> {
        match self.get(id)? {
            Node::Internal(node) => Ok(node),
            Node::Leaf(_) => Err(IndexError::corrupt(format!("{id} is not internal"))),
        }
    }

    /// Borrow a node that must be internal, mutably.
    pub fn internal_mut(&mut self, id: NodeId) -> Result<&mut InternalNode, IndexError> {
        match self.get_mut(id)? {
            Node::Internal(node) => Ok(node),
            Node::Leaf(_) => Err(IndexError::corrupt(format!("{id} is not internal"))),
        }
    }

    /// Number of live nodes.
    #[must_use]
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

impl<V> Default for NodeArena<V> {
    fn default() -> Self {
        Self::new()
    }
}
