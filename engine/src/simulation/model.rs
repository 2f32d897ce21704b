//! Reference model for deterministic simulation testing.
//!
//! The model is a plain `BTreeMap` from key to the objects stored under it,
//! in insertion order. Applying an [`Operation`] to the model yields the
//! [`Outcome`] a correct index must produce for the same operation.

use std::collections::BTreeMap;

use crate::storage::IndexError;
use crate::storage::btree::IterationOrder;
use crate::types::{Key, KeyType, ObjectRef};

use super::operation_gen::Operation;

/// The observable result of applying an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `put` returned whether the object was added.
    Inserted(bool),
    /// `set` returned the object it replaced.
    Replaced(Option<ObjectRef>),
    /// A specific object was removed.
    Removed,
    /// `remove_key` returned the object it removed.
    RemovedKey(ObjectRef),
    /// `get` returned this object.
    Found(Option<ObjectRef>),
    /// A range fetch returned these objects.
    Objects(Vec<ObjectRef>),
    /// The index was cleared.
    Cleared,
    /// The operation failed with an error of this kind.
    Failed(&'static str),
}

impl Outcome {
    /// Check whether the operation failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Short name of an error's kind, for comparing outcomes.
#[must_use]
pub const fn error_kind(error: &IndexError) -> &'static str {
    match error {
        IndexError::KeyNotUnique => "KeyNotUnique",
        IndexError::KeyNotFound => "KeyNotFound",
        IndexError::IncompatibleKeyType { .. } => "IncompatibleKeyType",
        IndexError::IndexedFieldNotFound { .. } => "IndexedFieldNotFound",
        IndexError::UnsupportedIndexType(_) => "UnsupportedIndexType",
        IndexError::ConcurrentModification => "ConcurrentModification",
        IndexError::InvalidOperation(_) => "InvalidOperation",
        IndexError::InvalidObject(_) => "InvalidObject",
        IndexError::CorruptIndex(_) => "CorruptIndex",
        IndexError::LockPoisoned => "LockPoisoned",
    }
}

/// Expected contents of an index.
#[derive(Debug)]
pub struct ReferenceModel {
    key_type: KeyType,
    unique: bool,
    entries: BTreeMap<Key, Vec<ObjectRef>>,
    len: usize,
}

impl ReferenceModel {
    /// Create an empty model of an index over `key_type`.
    #[must_use]
    pub const fn new(key_type: KeyType, unique: bool) -> Self {
        Self {
            key_type,
            unique,
            entries: BTreeMap::new(),
            len: 0,
        }
    }

    /// Number of stored objects.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if no objects are stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The object `Operation::Remove` targets: the `pick`-th object under
    /// `key`, or an object that was never stored.
    #[must_use]
    pub fn remove_target(&self, key: &Key, pick: usize) -> ObjectRef {
        self.entries
            .get(key)
            .filter(|objs| !objs.is_empty())
            .map_or(ObjectRef(0), |objs| objs[pick % objs.len()])
    }

    /// Every entry in `order`.
    #[must_use]
    pub fn entries(&self, order: IterationOrder) -> Vec<(Key, ObjectRef)> {
        let mut entries: Vec<(Key, ObjectRef)> = self
            .entries
            .iter()
            .flat_map(|(key, objs)| objs.iter().map(move |obj| (key.clone(), *obj)))
            .collect();
        if order == IterationOrder::Descending {
            entries.reverse();
        }
        entries
    }

    /// Apply `op` and return what the index must report.
    pub fn apply(&mut self, op: &Operation) -> Outcome {
        match op {
            Operation::Put { key, obj } => self.put(key, *obj),
            Operation::Set { key, obj } => self.set(key, *obj),
            Operation::Remove { key, pick } => {
                let obj = self.remove_target(key, *pick);
                self.remove(key, obj)
            }
            Operation::RemoveKey { key } => self.remove_key(key),
            Operation::Get { key } => self.get(key),
            Operation::Range { low, high, order } => {
                let mut objs: Vec<ObjectRef> = self
                    .entries
                    .range(Key::I64(*low)..=Key::I64(*high))
                    .flat_map(|(_, objs)| objs.iter().copied())
                    .collect();
                if *order == IterationOrder::Descending {
                    objs.reverse();
                }
                Outcome::Objects(objs)
            }
            Operation::Clear => {
                self.entries.clear();
                self.len = 0;
                Outcome::Cleared
            }
        }
    }

    fn put(&mut self, key: &Key, obj: ObjectRef) -> Outcome {
        if !self.key_type.accepts(key) {
            return Outcome::Failed("IncompatibleKeyType");
        }
        let objs = self.entries.entry(key.clone()).or_default();
        if self.unique && !objs.is_empty() {
            return Outcome::Inserted(false);
        }
        objs.push(obj);
        self.len += 1;
        Outcome::Inserted(true)
    }

    fn set(&mut self, key: &Key, obj: ObjectRef) -> Outcome {
        if !self.key_type.accepts(key) {
            return Outcome::Failed("IncompatibleKeyType");
        }
        let objs = self.entries.entry(key.clone()).or_default();
        match objs.as_mut_slice() {
            [] => {
                objs.push(obj);
                self.len += 1;
                Outcome::Replaced(None)
            }
            [only] => Outcome::Replaced(Some(std::mem::replace(only, obj))),
            _ => Outcome::Failed("KeyNotUnique"),
        }
    }

    fn remove(&mut self, key: &Key, obj: ObjectRef) -> Outcome {
        if !self.key_type.accepts(key) {
            return Outcome::Failed("IncompatibleKeyType");
        }
        let Some(objs) = self.entries.get_mut(key) else {
            return Outcome::Failed("KeyNotFound");
        };
        let Some(at) = objs.iter().position(|stored| *stored == obj) else {
            return Outcome::Failed("KeyNotFound");
        };
        objs.remove(at);
        if objs.is_empty() {
            self.entries.remove(key);
        }
        self.len -= 1;
        Outcome::Removed
    }

    fn remove_key(&mut self, key: &Key) -> Outcome {
        if !self.key_type.accepts(key) {
            return Outcome::Failed("IncompatibleKeyType");
        }
        if !self.unique {
            return Outcome::Failed("KeyNotUnique");
        }
        match self.entries.remove(key) {
            Some(objs) if !objs.is_empty() => {
                self.len -= objs.len();
                Outcome::RemovedKey(objs[0])
            }
            _ => Outcome::Failed("KeyNotFound"),
        }
    }

    fn get(&self, key: &Key) -> Outcome {
        if !self.key_type.accepts(key) {
            return Outcome::Failed("IncompatibleKeyType");
        }
        match self.entries.get(key).map(Vec::as_slice) {
            None | Some([]) => Outcome::Found(None),
            Some([only]) => Outcome::Found(Some(*only)),
            Some(_) => Outcome::Failed("KeyNotUnique"),
        }
    }
}
