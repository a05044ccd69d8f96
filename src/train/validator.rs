//! One epoch of forward-only evaluation for a single ensemble member

use tracing::info;

use super::meter::AverageMeter;
use super::metrics::topk_accuracy;
use crate::config::EnsembleConfig;
use crate::data::ImageBatch;
use crate::error::{EnsembleError, Result};
use crate::loss::BatchLoss;
use crate::model::ImageClassifier;
use crate::tracking::ScalarWriter;

/// Run one validation epoch: primary logits only, no gradients, no
/// parameter mutation
///
/// Epoch aggregates are emitted once at `cur_step` (the caller passes the
/// global step reached by training, `(epoch + 1) × batches_per_epoch`).
/// Returns the epoch's `(top1, top5)` as fractions.
pub fn validate_epoch(
    config: &EnsembleConfig,
    batches: &[ImageBatch],
    model: &dyn ImageClassifier,
    loss_fn: &dyn BatchLoss,
    epoch: usize,
    cur_step: u64,
    writer: &mut ScalarWriter,
) -> Result<(f32, f32)> {
    if batches.is_empty() {
        return Err(EnsembleError::EmptyDataset);
    }

    let mut losses = AverageMeter::new("losses");
    let mut top1 = AverageMeter::new("top1");
    let mut top5 = AverageMeter::new("top5");

    for batch in batches {
        let bs = batch.size();
        let logits = model.forward_eval(&batch.images);
        let loss = loss_fn.value(&logits, &batch.labels);

        losses.update(loss, bs);
        top1.update(topk_accuracy(logits.view(), &batch.labels, 1), bs);
        top5.update(topk_accuracy(logits.view(), &batch.labels, 5), bs);
    }

    writer.log_scalar("loss/test", losses.average(), cur_step)?;
    writer.log_scalar("acc1/test", top1.average(), cur_step)?;
    writer.log_scalar("acc5/test", top5.average(), cur_step)?;

    info!(
        "Valid: [{:3}/{}] Prec@(1,5) ({:.2}%, {:.2}%)",
        epoch + 1,
        config.epochs,
        top1.average() * 100.0,
        top5.average() * 100.0
    );

    Ok((top1.average(), top5.average()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Cli, EnsembleConfig};
    use crate::data::{Dataset, InMemoryDataset};
    use crate::loss::CrossEntropyLoss;
    use crate::model::{AffineClassifier, ImageClassifier};
    use crate::tracking::read_events;
    use clap::Parser;

    fn test_config() -> EnsembleConfig {
        EnsembleConfig::from(Cli::try_parse_from(["conjunto"]).unwrap())
    }

    #[test]
    fn test_validate_epoch_leaves_model_untouched() {
        let config = test_config();
        let ds = InMemoryDataset::synthetic(8, 12, 6, 3, 4, 5);
        let batches = ds.valid_batches();
        let mut model = AffineClassifier::new(6, 3, true, 2);
        let root = tempfile::tempdir().unwrap();
        let mut writer = ScalarWriter::create(root.path(), 0).unwrap();

        let before = model.forward_eval(&batches[0].images);
        let (top1, top5) =
            validate_epoch(&config, &batches, &model, &CrossEntropyLoss, 0, 0, &mut writer).unwrap();
        let after = model.forward_eval(&batches[0].images);

        assert_eq!(before, after, "validation must not mutate parameters");
        assert!((0.0..=1.0).contains(&top1));
        assert!(top5 >= top1);
        for param in model.parameters() {
            assert!(param.grad().is_none(), "validation must not touch gradients");
        }
    }

    #[test]
    fn test_validate_epoch_emits_one_event_set() {
        let config = test_config();
        let ds = InMemoryDataset::synthetic(8, 12, 6, 3, 4, 5);
        let batches = ds.valid_batches();
        let model = AffineClassifier::new(6, 3, false, 2);
        let root = tempfile::tempdir().unwrap();
        let mut writer = ScalarWriter::create(root.path(), 0).unwrap();

        validate_epoch(&config, &batches, &model, &CrossEntropyLoss, 2, 42, &mut writer).unwrap();
        writer.flush().unwrap();

        let events = read_events(writer.dir()).unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.step == 42));
        let tags: Vec<&str> = events.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, ["loss/test", "acc1/test", "acc5/test"]);
    }

    #[test]
    fn test_empty_validation_rejected() {
        let config = test_config();
        let model = AffineClassifier::new(6, 3, false, 2);
        let root = tempfile::tempdir().unwrap();
        let mut writer = ScalarWriter::create(root.path(), 0).unwrap();

        let err = validate_epoch(&config, &[], &model, &CrossEntropyLoss, 0, 0, &mut writer)
            .unwrap_err();
        assert!(matches!(err, EnsembleError::EmptyDataset));
    }
}
