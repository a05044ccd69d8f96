//! Sequential driver for the whole ensemble
//!
//! Members are trained strictly one after another. Each iteration owns its
//! model, optimizer, early-stop state, and run directory exclusively; none
//! of it is reused once the member's loop ends.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use super::early_stop::{EarlyStopMonitor, StopDecision};
use super::trainer::train_epoch;
use super::validator::validate_epoch;
use crate::config::EnsembleConfig;
use crate::data::Dataset;
use crate::error::{EnsembleError, Result};
use crate::loss::CrossEntropyLoss;
use crate::model::{ImageClassifier, ModelFactory};
use crate::optim::Adam;
use crate::tracking::ScalarWriter;

/// Drop-path probability for the given epoch: a linear ramp from 0 at epoch
/// 0 toward `max`, reaching `max × (total − 1) / total` on the last epoch
pub fn drop_path_prob_at(max: f32, epoch: usize, total: usize) -> f32 {
    max * epoch as f32 / total as f32
}

/// Outcome of one member's training run
#[derive(Debug, Clone, Serialize)]
pub struct MemberResult {
    pub ordinal: usize,
    /// Best validation top-1 (fraction)
    pub best_top1: f32,
    /// Best validation top-5 (fraction)
    pub best_top5: f32,
    pub epochs_run: usize,
    pub stopped_early: bool,
    pub run_dir: PathBuf,
}

/// Trains every configured ensemble member in sequence
pub struct EnsembleDriver {
    config: EnsembleConfig,
}

impl EnsembleDriver {
    /// Create a driver after validating the configuration
    pub fn new(config: EnsembleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this driver runs with
    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// Train the whole ensemble
    ///
    /// Member `i`'s architecture descriptor is expected at
    /// `checkpoints/checkpoint-{i}.json`; the descriptor is handed to the
    /// factory unopened. Any member's failure aborts the run.
    pub fn run(
        &self,
        factory: &dyn ModelFactory,
        dataset: &dyn Dataset,
    ) -> Result<Vec<MemberResult>> {
        let mut results = Vec::with_capacity(self.config.models);

        for ordinal in 0..self.config.models {
            let descriptor = self.config.checkpoints.join(format!("checkpoint-{ordinal}.json"));
            let mut model = factory.build(&descriptor)?;

            if model.num_classes() != dataset.num_classes() {
                return Err(EnsembleError::ClassCountMismatch {
                    model: model.num_classes(),
                    dataset: dataset.num_classes(),
                });
            }

            results.push(self.fit_member(ordinal, model.as_mut(), dataset)?);
        }

        Ok(results)
    }

    /// Train one member to completion or early stop
    fn fit_member(
        &self,
        ordinal: usize,
        model: &mut dyn ImageClassifier,
        dataset: &dyn Dataset,
    ) -> Result<MemberResult> {
        let config = &self.config;
        let seed = config.member_seed(ordinal);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut optimizer = Adam::default_params(config.lr);
        let mut monitor = EarlyStopMonitor::new(config.early_stop);
        let mut writer = ScalarWriter::create(&config.out_dir, ordinal)?;
        writer.write_params(config)?;

        info!("member {ordinal}: training starts (seed {seed}, run dir {})", writer.dir().display());

        let mut stopped_early = false;
        let mut epochs_run = 0;

        for epoch in 0..config.epochs {
            let drop_prob = drop_path_prob_at(config.drop_path_prob, epoch, config.epochs);
            model.set_drop_path_prob(drop_prob);

            let train_batches = dataset.train_batches(&mut rng);
            let steps_per_epoch = train_batches.len();
            train_epoch(
                config,
                &train_batches,
                model,
                &mut optimizer,
                &CrossEntropyLoss,
                epoch,
                &mut writer,
            )?;

            let cur_step = ((epoch + 1) * steps_per_epoch) as u64;
            let (top1, top5) = validate_epoch(
                config,
                &dataset.valid_batches(),
                model,
                &CrossEntropyLoss,
                epoch,
                cur_step,
                &mut writer,
            )?;

            epochs_run = epoch + 1;
            if monitor.observe(top1, top5) == StopDecision::Stop {
                stopped_early = true;
                break;
            }
        }

        writer.flush()?;
        info!(
            "member {ordinal}: final best Prec@1 = {:.2}% Prec@5 = {:.2}%",
            monitor.best_top1() * 100.0,
            monitor.best_top5() * 100.0
        );

        Ok(MemberResult {
            ordinal,
            best_top1: monitor.best_top1(),
            best_top5: monitor.best_top5(),
            epochs_run,
            stopped_early,
            run_dir: writer.dir().to_path_buf(),
        })
    }
}
