//! In-memory B+tree used by every index.
//!
//! # Structure
//!
//! The tree consists of:
//! - Internal nodes: separator keys and child node ids
//! - Leaf nodes: sorted `(key, value)` entries, doubly linked for range scans
//!
//! Nodes live in an arena owned by the tree. Keys are [`crate::types::Key`]
//! values ordered by a [`Comparator`].
//!
//! # Usage
//!
//! ```
//! use engine::storage::btree::{BTree, InsertMode, IterationOrder, KeyRange};
//! use engine::types::Key;
//!
//! let mut tree = BTree::with_capacity(4);
//! for n in 0..10_i64 {
//!     tree.insert(Key::from(n), n * 10, InsertMode::Unique).expect("insert");
//! }
//!
//! let values: Vec<i64> = tree
//!     .range(KeyRange::inclusive(3_i64, 5_i64), IterationOrder::Descending)
//!     .map(|entry| *entry.expect("iterate").1)
//!     .collect();
//! assert_eq!(values, vec![50, 40, 30]);
//! ```

mod comparator;
mod cursor;
mod node;
mod tree;

pub use comparator::{Comparator, compare_prefix};
pub use cursor::{Cursor, Entries, IterationOrder, KeyRange};
pub use node::{DEFAULT_NODE_CAPACITY, LeafEntry, MIN_NODE_CAPACITY};
pub use tree::{BTree, InsertMode, InsertOutcome};
