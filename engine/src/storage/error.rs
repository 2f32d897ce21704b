//! Errors raised by indexes and the object store.

use crate::types::ObjectRef;

/// Errors returned by index and store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A unique constraint was violated, or a key-only operation hit more
    /// than one entry.
    KeyNotUnique,
    /// The requested entry does not exist.
    KeyNotFound,
    /// A key, bound or field does not match the index key type.
    IncompatibleKeyType { expected: String, found: String },
    /// The record type has no field with this name.
    IndexedFieldNotFound {
        record: &'static str,
        field: String,
    },
    /// The requested index operation is not available for this key type.
    UnsupportedIndexType(String),
    /// The index changed after the cursor was created or last reset.
    ConcurrentModification,
    /// The cursor is not positioned on an element.
    InvalidOperation(&'static str),
    /// The object reference does not name a live object.
    InvalidObject(ObjectRef),
    /// A structural invariant of the tree does not hold.
    CorruptIndex(String),
    /// A lock guarding the index was poisoned by a panicking holder.
    LockPoisoned,
}

impl IndexError {
    /// Check whether the index is still usable after this error.
    ///
    /// Only corruption leaves the index in an unknown state.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CorruptIndex(_))
    }

    /// Build a type mismatch error.
    pub(crate) fn incompatible(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::IncompatibleKeyType {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Build a corruption error and log it.
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("index corruption detected: {}", message);
        Self::CorruptIndex(message)
    }
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyNotUnique => write!(f, "key is not unique"),
            Self::KeyNotFound => write!(f, "key not found"),
            Self::IncompatibleKeyType { expected, found } => {
                write!(f, "incompatible key type: expected {expected}, found {found}")
            }
            Self::IndexedFieldNotFound { record, field } => {
                write!(f, "indexed field not found: {record}.{field}")
            }
            Self::UnsupportedIndexType(what) => write!(f, "unsupported index type: {what}"),
            Self::ConcurrentModification => {
                write!(f, "index was modified during iteration")
            }
            Self::InvalidOperation(what) => write!(f, "invalid operation: {what}"),
            Self::InvalidObject(obj) => write!(f, "invalid object reference: {obj}"),
            Self::CorruptIndex(message) => write!(f, "corrupt index: {message}"),
            Self::LockPoisoned => write!(f, "index lock poisoned"),
        }
    }
}

impl std::error::Error for IndexError {}
