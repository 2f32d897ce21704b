//! Main simulator harness for deterministic simulation testing.
//!
//! This module ties together all the simulation components to drive any
//! [`ObjectIndex`] through a generated workload and compare it with the
//! reference model.

use crate::storage::IndexError;
use crate::storage::btree::KeyRange;
use crate::storage::indexes::ObjectIndex;
use crate::types::{Key, ObjectRef};

use super::invariants::{InvariantChecker, InvariantViolation, OperationHistory};
use super::model::{Outcome, ReferenceModel, error_kind};
use super::operation_gen::{Operation, OperationGenConfig, OperationGenerator};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Operation generation configuration.
    pub operation_config: OperationGenConfig,
    /// Number of operations between whole-index checks. Zero checks only
    /// at the end of the run.
    pub check_interval: usize,
}

impl SimulatorConfig {
    /// Create a new simulator config with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            operation_config: OperationGenConfig::default(),
            check_interval: 64,
        }
    }

    /// Set the operation configuration.
    #[must_use]
    pub const fn with_operation_config(mut self, config: OperationGenConfig) -> Self {
        self.operation_config = config;
        self
    }

    /// Set the rate of operations with keys of the wrong type.
    #[must_use]
    pub const fn with_mistyped_rate(mut self, rate: f64) -> Self {
        self.operation_config.mistyped_rate = rate;
        self
    }

    /// Set the number of distinct keys.
    #[must_use]
    pub const fn with_key_space(mut self, key_space: i64) -> Self {
        self.operation_config.key_space = key_space;
        self
    }

    /// Set how often the whole index is checked.
    #[must_use]
    pub const fn with_check_interval(mut self, interval: usize) -> Self {
        self.check_interval = interval;
        self
    }
}

/// Results from a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The seed used for this simulation.
    pub seed: u64,
    /// Number of operations applied.
    pub operations_applied: usize,
    /// Number of successful operations.
    pub successful_operations: u64,
    /// Number of failed operations (expected failures like ambiguous keys).
    pub failed_operations: u64,
    /// Number of entries in the index at the end of the run.
    pub final_len: usize,
    /// Invariant violations detected.
    pub invariant_violations: Vec<InvariantViolation>,
    /// Whether the simulation ran to the end.
    pub completed_successfully: bool,
    /// Error message if simulation stopped early.
    pub error: Option<String>,
}

impl SimulationResult {
    /// Check if the simulation passed (no invariant violations).
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty() is not const-stable
    pub fn passed(&self) -> bool {
        self.completed_successfully && self.invariant_violations.is_empty()
    }
}

/// The main simulator harness.
///
/// This ties together all simulation components:
/// - Operation generator
/// - Reference model
/// - Invariant checker
/// - The index under test
pub struct Simulator<I> {
    config: SimulatorConfig,
    generator: OperationGenerator,
    index: I,
    model: ReferenceModel,
    history: OperationHistory,
    checker: InvariantChecker,
}

impl<I: ObjectIndex> Simulator<I> {
    /// Create a new simulator driving `index`, which must be empty.
    #[must_use]
    pub fn new(config: SimulatorConfig, index: I) -> Self {
        let generator = OperationGenerator::with_config(config.seed, config.operation_config.clone());
        let model = ReferenceModel::new(index.key_type().clone(), index.is_unique());

        Self {
            config,
            generator,
            index,
            model,
            history: OperationHistory::new(),
            checker: InvariantChecker::new(),
        }
    }

    /// Run the simulation for a given number of operations.
    ///
    /// Every operation's outcome is compared with the reference model, and
    /// the whole index is checked every `check_interval` operations and at
    /// the end. A corrupt index stops the run.
    pub fn run(&mut self, operation_count: usize) -> SimulationResult {
        let mut error = None;

        for _ in 0..operation_count {
            let operation = self.generator.next_operation();
            let operation_index = self.history.len();

            let expected = self.model.apply(&operation);
            let actual = match self.apply(&operation) {
                Ok(outcome) => outcome,
                Err(IndexError::CorruptIndex(message)) => {
                    error = Some(format!("index corrupted by {operation:?}: {message}"));
                    break;
                }
                Err(e) => Outcome::Failed(error_kind(&e)),
            };

            self.checker
                .check_outcome(&operation, &expected, &actual, operation_index);
            self.history.record(operation, actual);

            if self.config.check_interval > 0
                && self.history.len() % self.config.check_interval == 0
            {
                self.checker
                    .check_index(&self.index, &self.model, operation_index);
            }
        }

        if error.is_none() {
            self.checker
                .check_index(&self.index, &self.model, self.history.len());
        }

        let stats = self.history.stats();
        tracing::debug!(
            "Simulation seed={} applied {} operations ({} failed as expected)",
            self.config.seed,
            stats.total_operations,
            stats.failed
        );

        SimulationResult {
            seed: self.config.seed,
            operations_applied: stats.total_operations,
            successful_operations: stats.successful,
            failed_operations: stats.failed,
            final_len: self.index.len(),
            invariant_violations: self.checker.violations().to_vec(),
            completed_successfully: error.is_none(),
            error,
        }
    }

    /// Apply one operation to the index under test.
    fn apply(&mut self, operation: &Operation) -> Result<Outcome, IndexError> {
        let outcome = match operation {
            Operation::Put { key, obj } => Outcome::Inserted(self.index.put(key.clone(), *obj)?),
            Operation::Set { key, obj } => Outcome::Replaced(self.index.set(key.clone(), *obj)?),
            Operation::Remove { key, pick } => {
                // The model has already applied this operation.
                let obj = self.remove_target(key, *pick)?;
                self.index.remove(key, obj)?;
                Outcome::Removed
            }
            Operation::RemoveKey { key } => Outcome::RemovedKey(self.index.remove_key(key)?),
            Operation::Get { key } => Outcome::Found(self.index.get(key)?),
            Operation::Range { low, high, order } => Outcome::Objects(
                self.index
                    .get_range_ordered(&KeyRange::inclusive(*low, *high), *order)?,
            ),
            Operation::Clear => {
                self.index.clear();
                Outcome::Cleared
            }
        };
        Ok(outcome)
    }

    /// The object a remove targets, read from the index itself: the
    /// `pick`-th object under `key` in insertion order.
    fn remove_target(&self, key: &Key, pick: usize) -> Result<ObjectRef, IndexError> {
        if !self.index.key_type().accepts(key) {
            return Ok(ObjectRef(0));
        }
        let objs = self.index.get_range(&KeyRange::exact(key.clone()))?;
        Ok(if objs.is_empty() {
            ObjectRef(0)
        } else {
            objs[pick % objs.len()]
        })
    }

    /// The index under test.
    #[must_use]
    pub const fn index(&self) -> &I {
        &self.index
    }

    /// Get the operation history.
    #[must_use]
    pub const fn history(&self) -> &OperationHistory {
        &self.history
    }

    /// Get the invariant checker.
    #[must_use]
    pub const fn checker(&self) -> &InvariantChecker {
        &self.checker
    }
}
