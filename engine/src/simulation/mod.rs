//! Deterministic Simulation Testing (DST) infrastructure.
//!
//! This module provides tools for testing indexes with:
//! - Reproducible random operation generation
//! - A reference model that predicts every outcome
//! - Invariant checking of order, mirror iteration, counts and tree shape
//!
//! # Design Principles
//!
//! 1. All randomness is seeded for reproducibility
//! 2. Given the same seed, execution is identical
//! 3. Every index kind is driven through the same [`ObjectIndex`] operations
//!
//! # Usage
//!
//! ```
//! use engine::simulation::{Simulator, SimulatorConfig};
//! use engine::storage::indexes::Index;
//! use engine::types::KeyType;
//!
//! let config = SimulatorConfig::new(12345) // seed
//!     .with_key_space(128);
//!
//! let mut sim = Simulator::new(config, Index::new(KeyType::I64, false));
//! let result = sim.run(1000); // Apply 1000 operations
//!
//! assert!(result.invariant_violations.is_empty());
//! ```
//!
//! [`ObjectIndex`]: crate::storage::indexes::ObjectIndex

mod invariants;
mod model;
mod operation_gen;
mod simulator;

pub use invariants::{
    HistoryStats, InvariantChecker, InvariantViolation, OperationHistory, RecordedOperation,
};
pub use model::{Outcome, ReferenceModel};
pub use operation_gen::{Operation, OperationGenConfig, OperationGenerator};
pub use simulator::{SimulationResult, Simulator, SimulatorConfig};
