//! Ordered index storage engine.
//!
//! Indexes map comparable [`Key`](crate::types::Key)s to object references
//! and are built on an in-memory B+tree:
//!
//! - [`btree`]: the tree, its comparator and fail-fast cursors
//! - [`indexes`]: unique, duplicate, thick, field and bit indexes
//! - [`ObjectStore`]: owner of the objects indexes point at
//! - [`SharedIndex`]: lock-guarded handle for multi-threaded use
//!
//! # Usage
//!
//! ```
//! use engine::storage::{IndexError, indexes::{Index, ObjectIndex}};
//! use engine::types::{Key, KeyType, ObjectRef};
//!
//! let mut index = Index::new(KeyType::String, true);
//! index.put(Key::from("alpha"), ObjectRef(1))?;
//! index.put(Key::from("beta"), ObjectRef(2))?;
//!
//! assert_eq!(index.get(&Key::from("beta"))?, Some(ObjectRef(2)));
//! assert_eq!(index.prefix_search("al")?, vec![ObjectRef(1)]);
//! # Ok::<(), IndexError>(())
//! ```

pub mod btree;
mod error;
pub mod indexes;
mod shared;
mod store;

pub use error::IndexError;
pub use shared::SharedIndex;
pub use store::ObjectStore;
