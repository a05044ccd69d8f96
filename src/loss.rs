//! Loss functions over batched logits
//!
//! The model seam keeps backward passes inside the model, so a loss exposes
//! both its scalar value and its gradient with respect to the logits; the
//! trainer feeds that gradient to [`crate::model::ImageClassifier::backward`].

use ndarray::{Array2, ArrayView1};

/// Scalar loss plus its gradient with respect to the logits
#[derive(Debug, Clone)]
pub struct LossGrad {
    pub value: f32,
    /// `[batch, classes]`, same shape as the logits
    pub grad: Array2<f32>,
}

/// Trait for losses over `[batch, classes]` logits and integer targets
pub trait BatchLoss {
    /// Loss value only (evaluation path, no gradient work)
    fn value(&self, logits: &Array2<f32>, targets: &[usize]) -> f32;

    /// Loss value and d(loss)/d(logits) (training path)
    fn with_grad(&self, logits: &Array2<f32>, targets: &[usize]) -> LossGrad;

    /// Name of the loss function
    fn name(&self) -> &'static str;
}

/// Softmax cross-entropy with mean reduction over the batch
///
/// `L = -(1/B) Σ_b ln softmax(logits_b)[target_b]`, and
/// `dL/dlogits = (softmax - onehot) / B`.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Numerically stable row softmax: exp(x_i - max) / Σ exp(x_j - max)
    pub(crate) fn softmax_row(row: ArrayView1<'_, f32>) -> Vec<f32> {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let mut exp: Vec<f32> = row.iter().map(|&v| (v - max).exp()).collect();
        let sum: f32 = exp.iter().sum();
        for e in &mut exp {
            *e /= sum;
        }
        exp
    }
}

impl BatchLoss for CrossEntropyLoss {
    fn value(&self, logits: &Array2<f32>, targets: &[usize]) -> f32 {
        assert_eq!(logits.nrows(), targets.len(), "one target per logit row");
        let batch = targets.len();
        if batch == 0 {
            return 0.0;
        }

        let mut total = 0.0;
        for (row, &target) in logits.rows().into_iter().zip(targets) {
            let probs = Self::softmax_row(row);
            total -= probs[target].max(f32::MIN_POSITIVE).ln();
        }
        total / batch as f32
    }

    fn with_grad(&self, logits: &Array2<f32>, targets: &[usize]) -> LossGrad {
        assert_eq!(logits.nrows(), targets.len(), "one target per logit row");
        let batch = targets.len();
        let scale = 1.0 / batch as f32;

        let mut total = 0.0;
        let mut grad = Array2::zeros(logits.raw_dim());
        for (b, (row, &target)) in logits.rows().into_iter().zip(targets).enumerate() {
            let probs = Self::softmax_row(row);
            total -= probs[target].max(f32::MIN_POSITIVE).ln();
            for (c, &p) in probs.iter().enumerate() {
                let indicator = if c == target { 1.0 } else { 0.0 };
                grad[[b, c]] = (p - indicator) * scale;
            }
        }

        LossGrad { value: total * scale, grad }
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Cross-entropy of a one-hot target is never negative
        #[test]
        fn cross_entropy_non_negative(
            nc in 2usize..8,
            target in 0usize..8,
            seed in 0u32..1000,
        ) {
            let target = target % nc;
            let logits = Array2::from_shape_fn((1, nc), |(_, c)| {
                ((c as f32 + seed as f32) * 0.37).sin() * 10.0
            });
            let loss = CrossEntropyLoss.value(&logits, &[target]);
            prop_assert!(loss >= -1e-6);
        }

        /// Softmax rows are probability distributions
        #[test]
        fn softmax_rows_sum_to_one(
            nc in 2usize..8,
            scale in 0.1f32..100.0,
            seed in 0u32..1000,
        ) {
            let logits = Array2::from_shape_fn((1, nc), |(_, c)| {
                ((c as f32 + seed as f32) * 0.73).cos() * scale
            });
            let probs = CrossEntropyLoss::softmax_row(logits.row(0));
            let sum: f32 = probs.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-4);
            prop_assert!(probs.iter().all(|&p| (0.0..=1.0 + 1e-6).contains(&p)));
        }
    }
}
