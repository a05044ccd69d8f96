//! CLI command handler
//!
//! Wires the parsed arguments into collaborators and the driver. The model
//! factory and dataset built here are the crate's bundled reference
//! implementations; a deployment against a real search tool swaps in its own
//! [`ModelFactory`](crate::model::ModelFactory) and
//! [`Dataset`](crate::data::Dataset) and reuses everything else.

use std::fs;

use tracing::info;

use crate::config::{Cli, EnsembleConfig};
use crate::data::InMemoryDataset;
use crate::error::Result;
use crate::model::AffineFactory;
use crate::train::EnsembleDriver;

/// Demo split sizes for the bundled in-memory dataset
const DEMO_TRAIN_EXAMPLES: usize = 512;
const DEMO_VALID_EXAMPLES: usize = 128;

fn dataset_shape(name: &str) -> (usize, usize) {
    // (flattened feature width, classes) per known dataset name
    match name {
        "cifar100" => (3 * 32 * 32, 100),
        "mnist" => (28 * 28, 10),
        // cifar10 and friends
        _ => (3 * 32 * 32, 10),
    }
}

/// Run the single training mode
pub fn run_command(cli: Cli) -> Result<()> {
    let config = EnsembleConfig::from(cli);
    let driver = EnsembleDriver::new(config)?;
    let config = driver.config();

    let (feature_dim, num_classes) = dataset_shape(&config.dataset);
    info!(
        "dataset {} ({feature_dim} features, {num_classes} classes), {} members, device {}",
        config.dataset, config.models, config.device
    );

    let dataset = InMemoryDataset::synthetic(
        DEMO_TRAIN_EXAMPLES,
        DEMO_VALID_EXAMPLES,
        feature_dim,
        num_classes,
        config.batch_size,
        config.seed,
    );
    let factory = AffineFactory::new(feature_dim, num_classes, true, config.seed);

    let results = driver.run(&factory, &dataset)?;

    let summary_path = config.out_dir.join("summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&results)?)?;
    info!("ensemble summary written to {}", summary_path.display());

    Ok(())
}
