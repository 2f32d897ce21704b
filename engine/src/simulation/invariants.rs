//! Invariant checking for deterministic simulation testing.
//!
//! This module provides infrastructure for verifying index invariants
//! after operations, helping to detect bugs and structural corruption.

use std::collections::BTreeMap;

use crate::storage::btree::IterationOrder;
use crate::storage::indexes::ObjectIndex;
use crate::types::{Key, ObjectRef};

use super::model::{Outcome, ReferenceModel, error_kind};
use super::operation_gen::Operation;

/// A recorded operation in the simulation.
#[derive(Debug, Clone)]
pub struct RecordedOperation {
    /// The operation that was applied.
    pub operation: Operation,
    /// What the index reported.
    pub outcome: Outcome,
}

/// Tracks the history of operations for invariant checking.
#[derive(Debug, Default)]
pub struct OperationHistory {
    /// All operations in order.
    operations: Vec<RecordedOperation>,
    /// Number of operations per kind.
    per_kind: BTreeMap<&'static str, u64>,
    /// Number of operations that succeeded.
    successful: u64,
    /// Number of operations that failed with an expected error.
    failed: u64,
}

impl OperationHistory {
    /// Create a new empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied operation.
    pub fn record(&mut self, operation: Operation, outcome: Outcome) {
        *self.per_kind.entry(operation.name()).or_default() += 1;
        if outcome.is_failure() {
            self.failed += 1;
        } else {
            self.successful += 1;
        }
        self.operations.push(RecordedOperation { operation, outcome });
    }

    /// Get the number of operations.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len() is not const-stable
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if history is empty.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty() is not const-stable
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The last `count` operations, oldest first.
    #[must_use]
    pub fn tail(&self, count: usize) -> &[RecordedOperation] {
        &self.operations[self.operations.len().saturating_sub(count)..]
    }

    /// Get statistics.
    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            total_operations: self.operations.len(),
            successful: self.successful,
            failed: self.failed,
            per_kind: self.per_kind.clone(),
        }
    }
}

/// Statistics about the operation history.
#[derive(Debug, Clone)]
pub struct HistoryStats {
    /// Total number of operations.
    pub total_operations: usize,
    /// Number of operations that succeeded.
    pub successful: u64,
    /// Number of operations that failed with an expected error.
    pub failed: u64,
    /// Number of operations per kind.
    pub per_kind: BTreeMap<&'static str, u64>,
}

/// An invariant violation detected during simulation.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violation.
    pub description: String,
    /// Operation index where it was detected.
    pub operation_index: usize,
    /// Additional context.
    pub context: String,
}

/// Checker for index invariants.
pub struct InvariantChecker {
    /// Detected violations.
    violations: Vec<InvariantViolation>,
}

impl Default for InvariantChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantChecker {
    /// Create a new invariant checker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Get all violations.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    /// Check if any violations were detected.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty() is not const-stable
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Clear all recorded violations.
    pub fn clear(&mut self) {
        self.violations.clear();
    }

    /// Add a violation.
    pub fn add_violation(&mut self, violation: InvariantViolation) {
        self.violations.push(violation);
    }

    fn violation(&mut self, description: &str, operation_index: usize, context: String) {
        self.violations.push(InvariantViolation {
            description: description.to_string(),
            operation_index,
            context,
        });
    }

    /// Check that the index reported what the model expects.
    pub fn check_outcome(
        &mut self,
        operation: &Operation,
        expected: &Outcome,
        actual: &Outcome,
        operation_index: usize,
    ) {
        if expected != actual {
            self.violation(
                "Outcome differs from reference model",
                operation_index,
                format!("{operation:?}: expected {expected:?}, got {actual:?}"),
            );
        }
    }

    /// Check that ascending keys never decrease, and strictly increase in a
    /// unique index.
    pub fn check_order(
        &mut self,
        entries: &[(Key, ObjectRef)],
        unique: bool,
        operation_index: usize,
    ) {
        for pair in entries.windows(2) {
            let (left, right) = (&pair[0].0, &pair[1].0);
            if left > right || (unique && left == right) {
                self.violation(
                    "Entries out of order",
                    operation_index,
                    format!("{left} precedes {right}"),
                );
                return;
            }
        }
    }

    /// Check that descending iteration is the exact mirror of ascending.
    pub fn check_mirror(
        &mut self,
        ascending: &[(Key, ObjectRef)],
        descending: &[(Key, ObjectRef)],
        operation_index: usize,
    ) {
        let mirrored = ascending.len() == descending.len()
            && ascending.iter().eq(descending.iter().rev());
        if !mirrored {
            self.violation(
                "Descending iteration is not the reverse of ascending",
                operation_index,
                format!(
                    "{} ascending entries, {} descending entries",
                    ascending.len(),
                    descending.len()
                ),
            );
        }
    }

    /// Check that the index holds exactly the model's entries.
    pub fn check_contents(
        &mut self,
        index: &impl ObjectIndex,
        ascending: &[(Key, ObjectRef)],
        model: &ReferenceModel,
        operation_index: usize,
    ) {
        if index.len() != model.len() || ascending.len() != model.len() {
            self.violation(
                "Entry count mismatch",
                operation_index,
                format!(
                    "index reports {}, iteration yields {}, model holds {}",
                    index.len(),
                    ascending.len(),
                    model.len()
                ),
            );
            return;
        }
        if ascending != model.entries(IterationOrder::Ascending).as_slice() {
            self.violation(
                "Entries differ from reference model",
                operation_index,
                String::new(),
            );
        }
    }

    /// Run every whole-index check.
    pub fn check_index(
        &mut self,
        index: &impl ObjectIndex,
        model: &ReferenceModel,
        operation_index: usize,
    ) {
        if let Err(e) = index.validate() {
            self.violation("Structural invariant broken", operation_index, e.to_string());
        }
        let scans = index
            .entries(IterationOrder::Ascending)
            .and_then(|asc| Ok((asc, index.entries(IterationOrder::Descending)?)));
        match scans {
            Ok((ascending, descending)) => {
                self.check_order(&ascending, index.is_unique(), operation_index);
                self.check_mirror(&ascending, &descending, operation_index);
                self.check_contents(index, &ascending, model, operation_index);
            }
            Err(e) => self.violation(
                "Full scan failed",
                operation_index,
                format!("{}: {e}", error_kind(&e)),
            ),
        }
    }
}
