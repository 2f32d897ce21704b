//! Record schemas for field-extracted indexes.
//!
//! A record type describes its indexable fields once, as a static table of
//! [`Field`] descriptors. Field indexes look fields up by name when they
//! are created and use the stored accessors afterwards, so no reflection
//! happens on the hot path.

use super::key::{Key, KeyType};

/// How a field maps onto index keys.
pub enum FieldKind<T> {
    /// The field converts to a key of the given type.
    Key {
        key_type: KeyType,
        get: fn(&T) -> Key,
        /// Present for integer fields that an index may auto-number.
        assign: Option<fn(&mut T, i64)>,
    },
    /// The field has a type no key variant can represent.
    Unmapped { type_name: &'static str },
}

/// A named, indexable field of a record type.
pub struct Field<T> {
    pub name: &'static str,
    pub kind: FieldKind<T>,
}

impl<T> Field<T> {
    /// A field readable as a key.
    #[must_use]
    pub const fn key(name: &'static str, key_type: KeyType, get: fn(&T) -> Key) -> Self {
        Self {
            name,
            kind: FieldKind::Key {
                key_type,
                get,
                assign: None,
            },
        }
    }

    /// An integer field that can also be assigned a sequence number.
    #[must_use]
    pub const fn sequence(
        name: &'static str,
        key_type: KeyType,
        get: fn(&T) -> Key,
        assign: fn(&mut T, i64),
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Key {
                key_type,
                get,
                assign: Some(assign),
            },
        }
    }

    /// A field whose type cannot be used as a key.
    #[must_use]
    pub const fn unmapped(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Unmapped { type_name },
        }
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FieldKind::Key { key_type, .. } => write!(f, "Field({}: {key_type})", self.name),
            FieldKind::Unmapped { type_name } => write!(f, "Field({}: {type_name})", self.name),
        }
    }
}

/// A record type with a static field table.
pub trait Record: Sized + 'static {
    /// Name used in error messages.
    const TYPE_NAME: &'static str;

    /// All fields an index may be built over.
    fn fields() -> &'static [Field<Self>];

    /// Find a field by name.
    #[must_use]
    fn field(name: &str) -> Option<&'static Field<Self>> {
        Self::fields().iter().find(|field| field.name == name)
    }
}
