//! Indexes keyed by record fields.
//!
//! A [`FieldIndex`] wraps an [`Index`] and derives every key from the record
//! being indexed. With one field the key is that field's value; with several
//! it is a composite of their values in declaration order. Fields are
//! resolved by name once, when the index is created.

use crate::storage::btree::{IterationOrder, KeyRange};
use crate::storage::error::IndexError;
use crate::storage::indexes::{Index, IndexOptions, Iter, ObjectIndex};
use crate::types::{Field, FieldKind, Key, KeyType, ObjectRef, Record};

/// An index over one or more fields of `T`.
#[derive(Debug)]
pub struct FieldIndex<T: Record> {
    index: Index,
    fields: Vec<&'static Field<T>>,
    /// Last value handed out by [`FieldIndex::append`].
    sequence: i64,
}

impl<T: Record> FieldIndex<T> {
    /// Create an index over a single field.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::IndexedFieldNotFound`] if `T` has no such field
    /// and [`IndexError::IncompatibleKeyType`] if the field cannot be a key.
    pub fn new(field: &str, unique: bool) -> Result<Self, IndexError> {
        Self::compound(&[field], unique, &IndexOptions::default())
    }

    /// Create an index over several fields, compared left to right.
    ///
    /// # Errors
    ///
    /// Same as [`FieldIndex::new`], for every named field.
    pub fn compound(
        field_names: &[&str],
        unique: bool,
        options: &IndexOptions,
    ) -> Result<Self, IndexError> {
        let mut fields = Vec::with_capacity(field_names.len());
        let mut key_types = Vec::with_capacity(field_names.len());
        for &name in field_names {
            let field = T::field(name).ok_or_else(|| IndexError::IndexedFieldNotFound {
                record: T::TYPE_NAME,
                field: name.to_string(),
            })?;
            match &field.kind {
                FieldKind::Key { key_type, .. } => key_types.push(key_type.clone()),
                FieldKind::Unmapped { type_name } => {
                    return Err(IndexError::incompatible("a key type", *type_name));
                }
            }
            fields.push(field);
        }

        let key_type = match key_types.len() {
            0 => {
                return Err(IndexError::IndexedFieldNotFound {
                    record: T::TYPE_NAME,
                    field: String::new(),
                });
            }
            1 => key_types.remove(0),
            _ => KeyType::Composite(key_types),
        };

        tracing::debug!(
            "Created field index on {}.{} ({})",
            T::TYPE_NAME,
            field_names.join(","),
            key_type
        );
        Ok(Self {
            index: Index::with_options(key_type, unique, options),
            fields,
            sequence: 0,
        })
    }

    /// Names of the indexed fields, in key order.
    #[must_use]
    pub fn key_fields(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }

    /// The underlying index, for lookups and iteration.
    #[must_use]
    pub const fn index(&self) -> &Index {
        &self.index
    }

    /// The key type of the index.
    #[must_use]
    pub fn key_type(&self) -> &KeyType {
        self.index.key_type()
    }

    /// Number of indexed objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if no objects are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Extract the key of `record`.
    pub fn key_of(&self, record: &T) -> Result<Key, IndexError> {
        let mut values = self
            .fields
            .iter()
            .map(|field| match &field.kind {
                FieldKind::Key { get, .. } => Ok(get(record)),
                FieldKind::Unmapped { type_name } => {
                    Err(IndexError::incompatible("a key type", *type_name))
                }
            })
            .collect::<Result<Vec<Key>, IndexError>>()?;
        if values.len() == 1 {
            Ok(values.remove(0))
        } else {
            Ok(Key::Composite(values))
        }
    }

    /// Index `record` under its current field values.
    ///
    /// Returns `false` if the index is unique and the key is taken.
    pub fn put(&mut self, obj: ObjectRef, record: &T) -> Result<bool, IndexError> {
        let key = self.key_of(record)?;
        self.index.put(key, obj)
    }

    /// Index `record`, replacing the object stored under its key.
    pub fn set(&mut self, obj: ObjectRef, record: &T) -> Result<Option<ObjectRef>, IndexError> {
        let key = self.key_of(record)?;
        self.index.set(key, obj)
    }

    /// Stop indexing `record`.
    ///
    /// Returns `false` if it was not indexed under its current key.
    pub fn remove(&mut self, obj: ObjectRef, record: &T) -> Result<bool, IndexError> {
        let key = self.key_of(record)?;
        match self.index.remove(&key, obj) {
            Ok(()) => Ok(true),
            Err(IndexError::KeyNotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check whether `record` is indexed under its current key.
    pub fn contains(&self, obj: ObjectRef, record: &T) -> Result<bool, IndexError> {
        let key = self.key_of(record)?;
        self.index.contains(&key, obj)
    }

    /// Assign the next sequence number to the indexed field of `record` and
    /// index it.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnsupportedIndexType`] unless the index is over
    /// a single assignable `I32` or `I64` field, and
    /// [`IndexError::KeyNotUnique`] if a unique index already holds the next
    /// number. A failed append neither changes `record` nor consumes the
    /// number.
    pub fn append(&mut self, obj: ObjectRef, record: &mut T) -> Result<(), IndexError> {
        let [field] = self.fields.as_slice() else {
            return Err(IndexError::UnsupportedIndexType(format!(
                "append on compound index {}",
                self.index.key_type()
            )));
        };
        let FieldKind::Key {
            key_type: KeyType::I32 | KeyType::I64,
            assign: Some(assign),
            ..
        } = &field.kind
        else {
            return Err(IndexError::UnsupportedIndexType(format!(
                "append on field {}.{} of type {}",
                T::TYPE_NAME,
                field.name,
                self.index.key_type()
            )));
        };

        let next = self.sequence + 1;
        let next_key = if *self.index.key_type() == KeyType::I32 {
            let value = i32::try_from(next).map_err(|_| {
                IndexError::UnsupportedIndexType(format!(
                    "sequence of {}.{} exhausted",
                    T::TYPE_NAME,
                    field.name
                ))
            })?;
            Key::I32(value)
        } else {
            Key::I64(next)
        };
        // The record is left untouched when the next number is taken.
        if self.index.is_unique()
            && !self.index.get_range(&KeyRange::exact(next_key))?.is_empty()
        {
            return Err(IndexError::KeyNotUnique);
        }

        assign(record, next);
        let key = self.key_of(record)?;
        if !self.index.put(key, obj)? {
            return Err(IndexError::KeyNotUnique);
        }
        self.sequence = next;
        Ok(())
    }

    /// The object indexed under `key`.
    pub fn get(&self, key: &Key) -> Result<Option<ObjectRef>, IndexError> {
        self.index.get(key)
    }

    /// Objects with keys in `range`, in ascending key order.
    pub fn get_range(&self, range: &KeyRange) -> Result<Vec<ObjectRef>, IndexError> {
        self.index.get_range(range)
    }

    /// Objects whose string key starts with `prefix`.
    pub fn prefix_search(&self, prefix: &str) -> Result<Vec<ObjectRef>, IndexError> {
        self.index.prefix_search(prefix)
    }

    /// Iterate over the objects with keys in `range`.
    pub fn range(&self, range: KeyRange, order: IterationOrder) -> Result<Iter<'_>, IndexError> {
        self.index.range(range, order)
    }

    /// Iterate over every object in ascending key order.
    #[must_use]
    pub const fn iter(&self) -> Iter<'_> {
        self.index.iter()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.index.clear();
    }
}
