// Layers, bottom up:
// 1. Keys and object references (types)
// 2. In-memory B+tree over a node arena, with detached, fail-fast cursors
//    (storage::btree)
// 3. Indexes built on the tree (storage::indexes)
//     - Index: unique or duplicate keys
//     - ThickIndex: keys with many objects each
//     - FieldIndex: keys read from record fields, single or compound
//     - BitIndex: property masks per object
// 4. Sharing across threads (storage::SharedIndex)
//
// The simulation module drives any index through a seeded workload and
// checks it against a reference model.

pub mod config;
pub mod simulation;
pub mod storage;
pub mod types;

#[cfg(test)]
mod index_tests;
#[cfg(test)]
mod testing;
