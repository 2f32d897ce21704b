#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from corrupt data.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use engine::config::EngineConfig;
use engine::simulation::{SimulationResult, Simulator, SimulatorConfig};
use engine::storage::indexes::{Index, ObjectIndex, ThickIndex};
use engine::types::KeyType;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: node_capacity={}, thick_threshold={}, seed={}, operations={}",
        config.node_capacity,
        config.thick_threshold,
        config.sim_seed,
        config.sim_operations
    );

    let options = config.index_options();
    let results = [
        (
            "unique",
            simulate(&config, Index::with_options(KeyType::I64, true, &options)),
        ),
        (
            "duplicate",
            simulate(&config, Index::with_options(KeyType::I64, false, &options)),
        ),
        (
            "thick",
            simulate(&config, ThickIndex::with_options(KeyType::I64, &options)),
        ),
    ];

    let mut failed = false;
    for (name, result) in &results {
        if result.passed() {
            tracing::info!(
                "{name} index: {} operations ({} rejected), {} entries at end",
                result.operations_applied,
                result.failed_operations,
                result.final_len
            );
            continue;
        }
        failed = true;
        if let Some(error) = &result.error {
            tracing::error!("{name} index stopped early: {error}");
        }
        for violation in &result.invariant_violations {
            tracing::error!(
                "{name} index violation at operation {}: {} ({})",
                violation.operation_index,
                violation.description,
                violation.context
            );
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn simulate<I: ObjectIndex>(config: &EngineConfig, index: I) -> SimulationResult {
    let mut simulator = Simulator::new(SimulatorConfig::new(config.sim_seed), index);
    simulator.run(config.sim_operations)
}
