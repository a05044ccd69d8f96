//! Command-line arguments and the immutable run configuration
//!
//! Arguments are parsed once at process start and frozen into an
//! [`EnsembleConfig`] that is passed by reference to the trainer, validator,
//! and driver. Nothing reads configuration from ambient globals.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use crate::error::{EnsembleError, Result};

/// Conjunto: train an ensemble of fixed-architecture image classifiers
///
/// One architecture descriptor per member is read from the checkpoint
/// directory (`checkpoint-0.json`, `checkpoint-1.json`, ...); each member is
/// trained independently and its scalar metrics are streamed to a run
/// directory under the output root.
#[derive(Parser, Debug, Clone)]
#[command(name = "conjunto")]
#[command(author = "PAIML")]
#[command(version)]
pub struct Cli {
    /// Number of ensemble members to train
    #[arg(long, default_value_t = 5)]
    pub models: usize,

    /// Dataset name handed to the data provider
    #[arg(long, default_value = "cifar10")]
    pub dataset: String,

    /// Cutout augmentation length (consumed by the data provider)
    #[arg(long, default_value_t = 16)]
    pub cutout: usize,

    /// Channel width handed to the model factory
    #[arg(long, default_value_t = 16)]
    pub channels: usize,

    /// Layer count handed to the model factory
    #[arg(long, default_value_t = 5)]
    pub layers: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.001)]
    pub lr: f32,

    /// Batch size
    #[arg(long, default_value_t = 96)]
    pub batch_size: usize,

    /// Early-stop patience: epochs without validation improvement before a
    /// member's training halts
    #[arg(long = "early-stop", default_value_t = 10)]
    pub early_stop: usize,

    /// Log a training step line every N batches
    #[arg(long, default_value_t = 10)]
    pub log_frequency: usize,

    /// Maximum epochs per member
    #[arg(long, default_value_t = 600)]
    pub epochs: usize,

    /// Auxiliary-loss weight; 0 disables the auxiliary head's contribution
    #[arg(long, default_value_t = 0.4)]
    pub aux_weight: f32,

    /// Drop-path probability at the end of training (ramped linearly from 0)
    #[arg(long, default_value_t = 0.2)]
    pub drop_path_prob: f32,

    /// Data-loading worker count (consumed by the data provider)
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Gradient-clip norm; values <= 0 disable clipping
    #[arg(long, default_value_t = 5.0)]
    pub grad_clip: f32,

    /// Directory holding one architecture descriptor per member
    #[arg(long, default_value = "checkpoints")]
    pub checkpoints: PathBuf,

    /// Compute-device identifier (recorded in run params and handed to the
    /// model factory; tensor placement is the model implementation's concern)
    #[arg(long, default_value = "cuda:0")]
    pub device: String,

    /// Base random seed, reused for every member unless --distinct-seeds
    #[arg(long, default_value_t = 666)]
    pub seed: u64,

    /// Seed each member with base + ordinal instead of the shared base seed
    #[arg(long)]
    pub distinct_seeds: bool,

    /// Root directory for per-member run directories
    #[arg(long, default_value = "runs")]
    pub out_dir: PathBuf,
}

/// Immutable hyperparameters for one ensemble run
///
/// Serialized into each run directory's `params.json` so a run can always be
/// traced back to the exact configuration that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleConfig {
    pub models: usize,
    pub dataset: String,
    pub cutout: usize,
    pub channels: usize,
    pub layers: usize,
    pub lr: f32,
    pub batch_size: usize,
    pub early_stop: usize,
    pub log_frequency: usize,
    pub epochs: usize,
    pub aux_weight: f32,
    pub drop_path_prob: f32,
    pub workers: usize,
    /// `None` disables gradient clipping
    pub grad_clip: Option<f32>,
    pub checkpoints: PathBuf,
    pub device: String,
    pub seed: u64,
    pub distinct_seeds: bool,
    pub out_dir: PathBuf,
}

impl From<Cli> for EnsembleConfig {
    fn from(cli: Cli) -> Self {
        Self {
            models: cli.models,
            dataset: cli.dataset,
            cutout: cli.cutout,
            channels: cli.channels,
            layers: cli.layers,
            lr: cli.lr,
            batch_size: cli.batch_size,
            early_stop: cli.early_stop,
            log_frequency: cli.log_frequency.max(1),
            epochs: cli.epochs,
            aux_weight: cli.aux_weight,
            drop_path_prob: cli.drop_path_prob,
            workers: cli.workers,
            grad_clip: (cli.grad_clip > 0.0).then_some(cli.grad_clip),
            checkpoints: cli.checkpoints,
            device: cli.device,
            seed: cli.seed,
            distinct_seeds: cli.distinct_seeds,
            out_dir: cli.out_dir,
        }
    }
}

impl EnsembleConfig {
    /// Reject configurations the training loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.models == 0 {
            return Err(EnsembleError::InvalidConfig("models must be >= 1".into()));
        }
        if self.epochs == 0 {
            return Err(EnsembleError::InvalidConfig("epochs must be >= 1".into()));
        }
        if self.batch_size == 0 {
            return Err(EnsembleError::InvalidConfig("batch-size must be >= 1".into()));
        }
        if self.early_stop == 0 {
            return Err(EnsembleError::InvalidConfig("early-stop patience must be >= 1".into()));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(EnsembleError::InvalidConfig(format!("lr must be positive, got {}", self.lr)));
        }
        if !(0.0..1.0).contains(&self.drop_path_prob) {
            return Err(EnsembleError::InvalidConfig(format!(
                "drop-path-prob must be in [0, 1), got {}",
                self.drop_path_prob
            )));
        }
        if self.aux_weight < 0.0 {
            return Err(EnsembleError::InvalidConfig(format!(
                "aux-weight must be non-negative, got {}",
                self.aux_weight
            )));
        }
        Ok(())
    }

    /// Seed for the given member: shared base seed, or base + ordinal when
    /// distinct seeds were requested
    pub fn member_seed(&self, ordinal: usize) -> u64 {
        if self.distinct_seeds {
            self.seed.wrapping_add(ordinal as u64)
        } else {
            self.seed
        }
    }
}
