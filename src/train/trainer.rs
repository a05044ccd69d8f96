//! One epoch of training for a single ensemble member

use tracing::{debug, info};

use super::meter::AverageMeter;
use super::metrics::topk_accuracy;
use crate::config::EnsembleConfig;
use crate::data::ImageBatch;
use crate::error::{EnsembleError, Result};
use crate::loss::BatchLoss;
use crate::model::ImageClassifier;
use crate::optim::{clip_grad_norm, Optimizer};
use crate::tracking::ScalarWriter;

/// Aggregates from one epoch of a phase (accuracies as fractions in [0, 1])
#[derive(Debug, Clone, Copy)]
pub struct EpochStats {
    pub loss: f32,
    pub top1: f32,
    pub top5: f32,
}

/// Run one training epoch: forward, loss, backward, clip, step per batch
///
/// The total loss is the primary cross-entropy plus `aux_weight` times the
/// auxiliary head's loss when the weight is positive and the model produced
/// an auxiliary output; with `aux_weight` at zero the auxiliary logits never
/// touch the gradient. Per-batch scalars are emitted at the global step
/// `epoch × batches_per_epoch + batch_index`.
///
/// Mutates the model's parameters and the optimizer's moments in place. Any
/// failure is fatal to the member's run.
pub fn train_epoch(
    config: &EnsembleConfig,
    batches: &[ImageBatch],
    model: &mut dyn ImageClassifier,
    optimizer: &mut dyn Optimizer,
    loss_fn: &dyn BatchLoss,
    epoch: usize,
    writer: &mut ScalarWriter,
) -> Result<EpochStats> {
    if batches.is_empty() {
        return Err(EnsembleError::EmptyDataset);
    }

    let mut losses = AverageMeter::new("losses");
    let mut top1 = AverageMeter::new("top1");
    let mut top5 = AverageMeter::new("top5");

    let mut cur_step = (epoch * batches.len()) as u64;

    for (step, batch) in batches.iter().enumerate() {
        let bs = batch.size();

        optimizer.zero_grad(&mut model.parameters());

        let out = model.forward_train(&batch.images);
        let primary = loss_fn.with_grad(&out.logits, &batch.labels);
        let mut loss_val = primary.value;

        let aux_grad = match &out.aux_logits {
            Some(aux) if config.aux_weight > 0.0 => {
                let aux_loss = loss_fn.with_grad(aux, &batch.labels);
                loss_val += config.aux_weight * aux_loss.value;
                Some(aux_loss.grad * config.aux_weight)
            }
            _ => None,
        };

        model.backward(&primary.grad, aux_grad.as_ref());

        if let Some(max_norm) = config.grad_clip {
            clip_grad_norm(&mut model.parameters(), max_norm);
        }
        optimizer.step(&mut model.parameters());

        let acc1 = topk_accuracy(out.logits.view(), &batch.labels, 1);
        let acc5 = topk_accuracy(out.logits.view(), &batch.labels, 5);
        losses.update(loss_val, bs);
        top1.update(acc1, bs);
        top5.update(acc5, bs);

        writer.log_scalar("loss/train", loss_val, cur_step)?;
        writer.log_scalar("acc1/train", acc1, cur_step)?;
        writer.log_scalar("acc5/train", acc5, cur_step)?;

        if (step + 1) % config.log_frequency == 0 {
            debug!(
                "step {}/{}: loss={:.4}, lr={:.6}",
                step + 1,
                batches.len(),
                losses.average(),
                optimizer.lr()
            );
        }

        cur_step += 1;
    }

    info!(
        "Train: [{:3}/{}] Prec@(1,5) ({:.2}%, {:.2}%)",
        epoch + 1,
        config.epochs,
        top1.average() * 100.0,
        top5.average() * 100.0
    );

    Ok(EpochStats { loss: losses.average(), top1: top1.average(), top5: top5.average() })
}
