//! Engine configuration module.
//!
//! This module provides configuration loading for the index engine from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `ENGINE_NODE_CAPACITY`: Maximum entries per tree node (default: `64`, at least `4`)
//! - `ENGINE_THICK_THRESHOLD`: Objects per key a thick index keeps inline (default: `128`, at least `1`)
//! - `ENGINE_SIM_SEED`: Seed for the simulation binary (default: `1999`)
//! - `ENGINE_SIM_OPERATIONS`: Operations per simulation run (default: `10000`)
//!
//! # Invariants
//!
//! - `node_capacity` is never below [`MIN_NODE_CAPACITY`]
//! - `thick_threshold` is never zero

use crate::storage::btree::{DEFAULT_NODE_CAPACITY, MIN_NODE_CAPACITY};
use crate::storage::indexes::{DEFAULT_THICK_THRESHOLD, IndexOptions};

/// Engine configuration.
///
/// # Post-conditions
///
/// When constructed via `from_env()` or `from_lookup()`:
/// - `node_capacity >= MIN_NODE_CAPACITY`
/// - `thick_threshold >= 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of entries in a leaf, or children of an internal node.
    pub node_capacity: usize,
    /// Number of objects a thick index keeps inline per key before giving
    /// the key its own tree.
    pub thick_threshold: usize,
    /// Seed for the deterministic simulation.
    pub sim_seed: u64,
    /// Number of operations the simulation applies per index.
    pub sim_operations: usize,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            thick_threshold: DEFAULT_THICK_THRESHOLD,
            sim_seed: Self::DEFAULT_SIM_SEED,
            sim_operations: Self::DEFAULT_SIM_OPERATIONS,
        }
    }
}

impl EngineConfig {
    /// Default simulation seed.
    pub const DEFAULT_SIM_SEED: u64 = 1999;
    /// Default number of simulated operations.
    pub const DEFAULT_SIM_OPERATIONS: usize = 10_000;

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but not a valid number, or is
    /// below its minimum.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable or `None` if it is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let node_capacity = load_number(
            &lookup,
            "ENGINE_NODE_CAPACITY",
            DEFAULT_NODE_CAPACITY,
            MIN_NODE_CAPACITY,
        )?;
        let thick_threshold =
            load_number(&lookup, "ENGINE_THICK_THRESHOLD", DEFAULT_THICK_THRESHOLD, 1)?;
        let sim_seed = load_number(&lookup, "ENGINE_SIM_SEED", Self::DEFAULT_SIM_SEED, 0)?;
        let sim_operations = load_number(
            &lookup,
            "ENGINE_SIM_OPERATIONS",
            Self::DEFAULT_SIM_OPERATIONS,
            0,
        )?;

        Ok(Self {
            node_capacity,
            thick_threshold,
            sim_seed,
            sim_operations,
        })
    }

    /// Options for indexes created under this configuration.
    #[must_use]
    pub const fn index_options(&self) -> IndexOptions {
        IndexOptions {
            node_capacity: self.node_capacity,
            thick_threshold: self.thick_threshold,
        }
    }
}

/// Load a numeric variable.
///
/// Returns `default` if not set.
///
/// # Errors
///
/// Returns an error if the value is set but does not parse, or is below
/// `min`.
fn load_number<N>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: N,
    min: N,
) -> Result<N, ConfigError>
where
    N: std::str::FromStr + PartialOrd + std::fmt::Display,
{
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    let parsed = value
        .trim()
        .parse::<N>()
        .map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("'{value}' is not a valid number"),
        })?;
    if parsed < min {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("{parsed} is below the minimum of {min}"),
        });
    }
    Ok(parsed)
}
