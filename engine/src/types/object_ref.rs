//! Object identity.

use std::fmt;

/// A reference to a persistent object held by an [`ObjectStore`].
///
/// Indexes order object keys by this identity, never by the object's
/// contents. Two references are equal exactly when they name the same
/// stored object.
///
/// [`ObjectStore`]: crate::storage::ObjectStore
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectRef(pub u64);

impl ObjectRef {
    /// The object identifier.
    #[must_use]
    pub const fn oid(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ObjectRef {
    fn from(oid: u64) -> Self {
        Self(oid)
    }
}
