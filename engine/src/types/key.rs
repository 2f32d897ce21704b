//! Index keys.
//!
//! A [`Key`] is a tagged union over every scalar an index can order by,
//! plus composite keys built from an ordered list of scalars. Every index
//! fixes a [`KeyType`] at creation and rejects keys of any other shape.
//!
//! Keys of the same variant order naturally: numbers numerically, floats
//! by IEEE total order, strings by byte sequence, object references by
//! identity, and composites lexicographically field by field.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

use super::object_ref::ObjectRef;
use super::scalar::{DateTime, Decimal};

/// The shape of a key, fixed per index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    DateTime,
    Guid,
    String,
    Object,
    /// An ordered list of scalar field types.
    Composite(Vec<KeyType>),
}

impl KeyType {
    /// Check whether `key` may be stored under this type.
    ///
    /// Composite keys must carry exactly one value per field.
    #[must_use]
    pub fn accepts(&self, key: &Key) -> bool {
        match (self, key) {
            (Self::Composite(fields), Key::Composite(values)) => {
                fields.len() == values.len()
                    && fields.iter().zip(values).all(|(t, v)| t.accepts(v))
            }
            (expected, key) => *expected == key.key_type(),
        }
    }

    /// Check whether `key` may be used as a search bound under this type.
    ///
    /// Composite bounds may name a leading prefix of the fields; the
    /// remaining fields are left unconstrained.
    #[must_use]
    pub fn accepts_bound(&self, key: &Key) -> bool {
        match (self, key) {
            (Self::Composite(fields), Key::Composite(values)) => {
                values.len() <= fields.len()
                    && fields.iter().zip(values).all(|(t, v)| t.accepts(v))
            }
            _ => self.accepts(key),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite(fields) => {
                write!(f, "(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, ")")
            }
            other => write!(f, "{other:?}"),
        }
    }
}

/// A value an index is ordered by.
#[derive(Debug, Clone)]
pub enum Key {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    DateTime(DateTime),
    Guid(Uuid),
    String(String),
    Object(ObjectRef),
    Composite(Vec<Key>),
}

impl Key {
    /// The type of this key.
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Bool(_) => KeyType::Bool,
            Self::I8(_) => KeyType::I8,
            Self::U8(_) => KeyType::U8,
            Self::I16(_) => KeyType::I16,
            Self::U16(_) => KeyType::U16,
            Self::I32(_) => KeyType::I32,
            Self::U32(_) => KeyType::U32,
            Self::I64(_) => KeyType::I64,
            Self::U64(_) => KeyType::U64,
            Self::F32(_) => KeyType::F32,
            Self::F64(_) => KeyType::F64,
            Self::Decimal(_) => KeyType::Decimal,
            Self::DateTime(_) => KeyType::DateTime,
            Self::Guid(_) => KeyType::Guid,
            Self::String(_) => KeyType::String,
            Self::Object(_) => KeyType::Object,
            Self::Composite(values) => KeyType::Composite(values.iter().map(Self::key_type).collect()),
        }
    }

    /// Build a composite key from its field values.
    #[must_use]
    pub const fn composite(values: Vec<Self>) -> Self {
        Self::Composite(values)
    }

    /// The string payload, if this is a string key.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The referenced object, if this is an object key.
    #[must_use]
    pub const fn as_object(&self) -> Option<ObjectRef> {
        match self {
            Self::Object(obj) => Some(*obj),
            _ => None,
        }
    }

    /// Rank of the variant, used only to keep `Ord` total when keys of
    /// different shapes meet.
    const fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::I8(_) => 1,
            Self::U8(_) => 2,
            Self::I16(_) => 3,
            Self::U16(_) => 4,
            Self::I32(_) => 5,
            Self::U32(_) => 6,
            Self::I64(_) => 7,
            Self::U64(_) => 8,
            Self::F32(_) => 9,
            Self::F64(_) => 10,
            Self::Decimal(_) => 11,
            Self::DateTime(_) => 12,
            Self::Guid(_) => 13,
            Self::String(_) => 14,
            Self::Object(_) => 15,
            Self::Composite(_) => 16,
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::I8(a), Self::I8(b)) => a.cmp(b),
            (Self::U8(a), Self::U8(b)) => a.cmp(b),
            (Self::I16(a), Self::I16(b)) => a.cmp(b),
            (Self::U16(a), Self::U16(b)) => a.cmp(b),
            (Self::I32(a), Self::I32(b)) => a.cmp(b),
            (Self::U32(a), Self::U32(b)) => a.cmp(b),
            (Self::I64(a), Self::I64(b)) => a.cmp(b),
            (Self::U64(a), Self::U64(b)) => a.cmp(b),
            (Self::F32(a), Self::F32(b)) => a.total_cmp(b),
            (Self::F64(a), Self::F64(b)) => a.total_cmp(b),
            (Self::Decimal(a), Self::Decimal(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Guid(a), Self::Guid(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Self::Object(a), Self::Object(b)) => a.cmp(b),
            (Self::Composite(a), Self::Composite(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::I8(v) => v.hash(state),
            Self::U8(v) => v.hash(state),
            Self::I16(v) => v.hash(state),
            Self::U16(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::U32(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::U64(v) => v.hash(state),
            Self::F32(v) => v.to_bits().hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::Decimal(v) => v.hash(state),
            Self::DateTime(v) => v.hash(state),
            Self::Guid(v) => v.hash(state),
            Self::String(v) => v.hash(state),
            Self::Object(v) => v.hash(state),
            Self::Composite(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{v}"),
            Self::Guid(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Object(v) => write!(f, "{v}"),
            Self::Composite(values) => {
                write!(f, "(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, ")")
            }
        }
    }
}

macro_rules! key_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

key_from! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    DateTime => DateTime,
    Uuid => Guid,
    String => String,
    ObjectRef => Object,
    Vec<Key> => Composite,
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}
