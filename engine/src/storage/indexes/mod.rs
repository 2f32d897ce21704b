//! Object indexes built on the B+tree.
//!
//! - [`Index`]: key to object, unique or with duplicates stored inline
//! - [`ThickIndex`]: key to object, with duplicates grouped per key
//! - [`FieldIndex`]: an [`Index`] whose keys are extracted from records
//! - [`BitIndex`]: object to 32-bit mask, searched by required and
//!   forbidden bits
//!
//! [`Index`] and [`ThickIndex`] share the [`ObjectIndex`] operations so they
//! can be driven interchangeably.

pub mod bit;
pub mod field;
pub mod index;
pub mod thick;

pub use bit::{BitIndex, Select};
pub use field::FieldIndex;
pub use index::{Index, IndexCursor, Iter};
pub use thick::{ThickCursor, ThickIndex, ThickIter};

use crate::storage::btree::{DEFAULT_NODE_CAPACITY, IterationOrder, KeyRange};
use crate::storage::error::IndexError;
use crate::types::{Key, KeyType, ObjectRef};

/// Number of objects a thick index keeps inline per key before switching
/// the key to its own tree.
pub const DEFAULT_THICK_THRESHOLD: usize = 128;

/// Tunables shared by all index kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Maximum fan-out of a tree node.
    pub node_capacity: usize,
    /// Inline bucket size of a thick index.
    pub thick_threshold: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            thick_threshold: DEFAULT_THICK_THRESHOLD,
        }
    }
}

/// Operations common to key-to-object indexes.
pub trait ObjectIndex {
    /// The key type every stored key has.
    fn key_type(&self) -> &KeyType;

    /// Check whether equal keys are rejected.
    fn is_unique(&self) -> bool;

    /// Number of `(key, object)` entries.
    fn len(&self) -> usize;

    /// Check if the index holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add an entry.
    ///
    /// Returns `false` and leaves the index unchanged if the index is unique
    /// and `key` is already present.
    fn put(&mut self, key: Key, obj: ObjectRef) -> Result<bool, IndexError>;

    /// Add an entry, replacing the object stored under `key` if there is one.
    ///
    /// Returns the replaced object.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::KeyNotUnique`] if more than one object is stored
    /// under `key`.
    fn set(&mut self, key: Key, obj: ObjectRef) -> Result<Option<ObjectRef>, IndexError>;

    /// Remove the entry `(key, obj)`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::KeyNotFound`] if there is no such entry.
    fn remove(&mut self, key: &Key, obj: ObjectRef) -> Result<(), IndexError>;

    /// Remove the entry stored under `key` and return its object.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::KeyNotUnique`] if the index allows duplicates
    /// and [`IndexError::KeyNotFound`] if `key` is absent.
    fn remove_key(&mut self, key: &Key) -> Result<ObjectRef, IndexError>;

    /// The object stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::KeyNotUnique`] if more than one object is stored
    /// under `key`.
    fn get(&self, key: &Key) -> Result<Option<ObjectRef>, IndexError>;

    /// Objects with keys in `range`, in ascending key order.
    fn get_range(&self, range: &KeyRange) -> Result<Vec<ObjectRef>, IndexError> {
        self.get_range_ordered(range, IterationOrder::Ascending)
    }

    /// Objects with keys in `range`, in the given order.
    fn get_range_ordered(
        &self,
        range: &KeyRange,
        order: IterationOrder,
    ) -> Result<Vec<ObjectRef>, IndexError>;

    /// Objects whose string key starts with `prefix`, in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::IncompatibleKeyType`] unless keys are strings.
    fn prefix_search(&self, prefix: &str) -> Result<Vec<ObjectRef>, IndexError>;

    /// Check whether the entry `(key, obj)` exists.
    fn contains(&self, key: &Key, obj: ObjectRef) -> Result<bool, IndexError>;

    /// Every entry with its key, in the given order.
    fn entries(&self, order: IterationOrder) -> Result<Vec<(Key, ObjectRef)>, IndexError>;

    /// Every object in ascending key order.
    fn to_vec(&self) -> Result<Vec<ObjectRef>, IndexError> {
        Ok(self
            .entries(IterationOrder::Ascending)?
            .into_iter()
            .map(|(_, obj)| obj)
            .collect())
    }

    /// Remove every entry.
    fn clear(&mut self);

    /// Number of modifications since the index was created.
    fn modification_count(&self) -> u64;

    /// Check the structural invariants of the underlying trees.
    fn validate(&self) -> Result<(), IndexError>;
}

/// Reject keys that cannot be stored under `key_type`.
pub(crate) fn check_key(key_type: &KeyType, key: &Key) -> Result<(), IndexError> {
    if key_type.accepts(key) {
        Ok(())
    } else {
        Err(IndexError::incompatible(
            key_type.to_string(),
            key.key_type().to_string(),
        ))
    }
}

/// Reject range bounds that cannot be compared with keys of `key_type`.
pub(crate) fn check_range(key_type: &KeyType, range: &KeyRange) -> Result<(), IndexError> {
    for bound in range.bound_keys() {
        if !key_type.accepts_bound(bound) {
            return Err(IndexError::incompatible(
                key_type.to_string(),
                bound.key_type().to_string(),
            ));
        }
    }
    Ok(())
}

/// Build the range for a prefix search, rejecting non-string indexes.
pub(crate) fn prefix_range(key_type: &KeyType, prefix: &str) -> Result<KeyRange, IndexError> {
    if *key_type == KeyType::String {
        Ok(KeyRange::prefix(prefix))
    } else {
        Err(IndexError::incompatible(
            KeyType::String.to_string(),
            key_type.to_string(),
        ))
    }
}
