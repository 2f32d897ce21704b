pub mod key;
pub mod object_ref;
pub mod record;
pub mod scalar;

pub use key::{Key, KeyType};
pub use object_ref::ObjectRef;
pub use record::{Field, FieldKind, Record};
pub use scalar::{DateTime, Decimal, MAX_DECIMAL_SCALE};
