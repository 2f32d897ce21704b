//! In-memory object store.
//!
//! The store hands out stable [`ObjectRef`]s for the records indexes point
//! at, tracks which objects changed since the last flush, and keeps named
//! roots so indexes can be found again by name.
//!
//! Object ids are allocated sequentially starting at 1 and never reused, so a
//! reference to a deallocated object stays distinguishable from a live one.

use std::collections::{BTreeSet, HashMap};

use crate::storage::error::IndexError;
use crate::types::ObjectRef;

/// First object id handed out by a fresh store. Id 0 is never allocated.
const FIRST_OID: u64 = 1;

/// Owner of the objects that indexes refer to.
#[derive(Debug)]
pub struct ObjectStore<T> {
    objects: HashMap<ObjectRef, T>,
    next_oid: u64,
    dirty: BTreeSet<ObjectRef>,
    roots: HashMap<String, ObjectRef>,
}

impl<T> ObjectStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            next_oid: FIRST_OID,
            dirty: BTreeSet::new(),
            roots: HashMap::new(),
        }
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store holds no live objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Store `object` and return its new reference. New objects start dirty.
    pub fn allocate(&mut self, object: T) -> ObjectRef {
        let obj = ObjectRef(self.next_oid);
        self.next_oid += 1;
        self.objects.insert(obj, object);
        self.dirty.insert(obj);
        obj
    }

    /// Look up a live object.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidObject`] if `obj` was never allocated or
    /// has been deallocated.
    pub fn resolve(&self, obj: ObjectRef) -> Result<&T, IndexError> {
        self.objects.get(&obj).ok_or(IndexError::InvalidObject(obj))
    }

    /// Look up a live object for modification and mark it dirty.
    pub fn resolve_mut(&mut self, obj: ObjectRef) -> Result<&mut T, IndexError> {
        let object = self
            .objects
            .get_mut(&obj)
            .ok_or(IndexError::InvalidObject(obj))?;
        self.dirty.insert(obj);
        Ok(object)
    }

    /// Record that `obj` changed.
    pub fn mark_dirty(&mut self, obj: ObjectRef) -> Result<(), IndexError> {
        if !self.objects.contains_key(&obj) {
            return Err(IndexError::InvalidObject(obj));
        }
        self.dirty.insert(obj);
        Ok(())
    }

    /// Take the set of objects changed since the last call, in id order.
    pub fn take_dirty(&mut self) -> Vec<ObjectRef> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    /// Remove `obj` from the store and return it.
    ///
    /// Roots naming `obj` are dropped with it.
    pub fn deallocate(&mut self, obj: ObjectRef) -> Result<T, IndexError> {
        let object = self
            .objects
            .remove(&obj)
            .ok_or(IndexError::InvalidObject(obj))?;
        self.dirty.remove(&obj);
        self.roots.retain(|_, root| *root != obj);
        Ok(object)
    }

    /// Check whether `obj` was allocated and later deallocated.
    #[must_use]
    pub fn is_deleted(&self, obj: ObjectRef) -> bool {
        obj.oid() >= FIRST_OID && obj.oid() < self.next_oid && !self.objects.contains_key(&obj)
    }

    /// Register `obj` under `name`, returning the reference it replaces.
    pub fn set_root(
        &mut self,
        name: &str,
        obj: ObjectRef,
    ) -> Result<Option<ObjectRef>, IndexError> {
        if !self.objects.contains_key(&obj) {
            return Err(IndexError::InvalidObject(obj));
        }
        tracing::debug!("Registered root {} -> {}", name, obj);
        Ok(self.roots.insert(name.to_string(), obj))
    }

    /// The object registered under `name`.
    #[must_use]
    pub fn root(&self, name: &str) -> Option<ObjectRef> {
        self.roots.get(name).copied()
    }

    /// Iterate over live objects in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectRef, &T)> {
        let mut refs: Vec<ObjectRef> = self.objects.keys().copied().collect();
        refs.sort_unstable();
        refs.into_iter()
            .filter_map(|obj| self.objects.get(&obj).map(|object| (obj, object)))
    }
}

impl<T> Default for ObjectStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
