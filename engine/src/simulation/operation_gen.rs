//! Operation generator for deterministic simulation testing.
//!
//! This module generates random but reproducible sequences of index
//! operations, including operations with keys of the wrong type.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::storage::btree::IterationOrder;
use crate::types::{Key, ObjectRef};

/// Configuration for operation generation.
///
/// Rates are probabilities in `0.0..=1.0`. Whatever is left after the other
/// rates goes to `put`.
#[derive(Debug, Clone)]
pub struct OperationGenConfig {
    /// Number of distinct integer keys. Smaller spaces produce more
    /// duplicates and more collisions.
    pub key_space: i64,
    /// Probability of `set`.
    pub set_rate: f64,
    /// Probability of removing a specific object.
    pub remove_rate: f64,
    /// Probability of removing by key alone.
    pub remove_key_rate: f64,
    /// Probability of a point lookup.
    pub get_rate: f64,
    /// Probability of a range fetch.
    pub range_rate: f64,
    /// Probability of clearing the whole index.
    pub clear_rate: f64,
    /// Probability that a point operation uses a key of the wrong type.
    pub mistyped_rate: f64,
    /// Widest range a range fetch covers.
    pub max_range_width: i64,
}

impl Default for OperationGenConfig {
    fn default() -> Self {
        Self {
            key_space: 512,
            set_rate: 0.1,
            remove_rate: 0.2,
            remove_key_rate: 0.05,
            get_rate: 0.15,
            range_rate: 0.05,
            clear_rate: 0.0005,
            mistyped_rate: 0.0,
            max_range_width: 64,
        }
    }
}

/// An operation to apply to an index.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Insert an object under a key.
    Put { key: Key, obj: ObjectRef },
    /// Insert or replace the single object under a key.
    Set { key: Key, obj: ObjectRef },
    /// Remove one object stored under a key. `pick` selects which of the
    /// objects currently under the key is removed; a key with no objects
    /// removes an object that was never stored.
    Remove { key: Key, pick: usize },
    /// Remove the object under a key without naming it.
    RemoveKey { key: Key },
    /// Look up the single object under a key.
    Get { key: Key },
    /// Fetch the objects with keys in `low..=high`.
    Range {
        low: i64,
        high: i64,
        order: IterationOrder,
    },
    /// Remove every entry.
    Clear,
}

impl Operation {
    /// Short name for logs and statistics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Put { .. } => "put",
            Self::Set { .. } => "set",
            Self::Remove { .. } => "remove",
            Self::RemoveKey { .. } => "remove_key",
            Self::Get { .. } => "get",
            Self::Range { .. } => "range",
            Self::Clear => "clear",
        }
    }
}

/// Generator for random [`Operation`] sequences.
///
/// This generator produces deterministic sequences of operations
/// given the same seed, enabling reproducible testing.
pub struct OperationGenerator {
    rng: StdRng,
    config: OperationGenConfig,
    /// Next object id to insert. Ids only grow, so every inserted object is
    /// new to the index.
    next_oid: u64,
}

impl OperationGenerator {
    /// Create a new operation generator with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, OperationGenConfig::default())
    }

    /// Create a new operation generator with custom configuration.
    #[must_use]
    pub fn with_config(seed: u64, config: OperationGenConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
            next_oid: 1,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OperationGenConfig {
        &self.config
    }

    /// Generate the next operation.
    pub fn next_operation(&mut self) -> Operation {
        let roll = self.rng.random::<f64>();
        let config = &self.config;
        let thresholds = [
            config.clear_rate,
            config.set_rate,
            config.remove_rate,
            config.remove_key_rate,
            config.get_rate,
            config.range_rate,
        ];
        let mut bound = 0.0;
        let mut choice = thresholds.len();
        for (i, rate) in thresholds.iter().enumerate() {
            bound += rate;
            if roll < bound {
                choice = i;
                break;
            }
        }

        match choice {
            0 => Operation::Clear,
            1 => Operation::Set {
                key: self.random_key(),
                obj: self.fresh_object(),
            },
            2 => Operation::Remove {
                key: self.random_key(),
                pick: self.rng.random_range(0..16),
            },
            3 => Operation::RemoveKey {
                key: self.random_key(),
            },
            4 => Operation::Get {
                key: self.random_key(),
            },
            5 => self.random_range(),
            _ => Operation::Put {
                key: self.random_key(),
                obj: self.fresh_object(),
            },
        }
    }

    /// A key from the key space, or occasionally a key of the wrong type.
    fn random_key(&mut self) -> Key {
        if self.rng.random::<f64>() < self.config.mistyped_rate {
            return Key::from(format!("k{}", self.rng.random_range(0..self.config.key_space)));
        }
        Key::I64(self.rng.random_range(0..self.config.key_space))
    }

    fn random_range(&mut self) -> Operation {
        let low = self.rng.random_range(-1..self.config.key_space);
        let high = low + self.rng.random_range(0..=self.config.max_range_width);
        let order = if self.rng.random::<bool>() {
            IterationOrder::Ascending
        } else {
            IterationOrder::Descending
        };
        Operation::Range { low, high, order }
    }

    const fn fresh_object(&mut self) -> ObjectRef {
        let obj = ObjectRef(self.next_oid);
        self.next_oid += 1;
        obj
    }
}
