//! Scenario tests for the index engine.
//!
//! Each test file covers a specific scenario, using deterministic key
//! sequences so failures reproduce exactly.

#![cfg(test)]

mod test_bit_index;
mod test_compound_index;
mod test_concurrency;
mod test_cursor;
mod test_field_index;
mod test_key_types;
mod test_prefix_search;
mod test_thick_index;
mod test_uniqueness;
