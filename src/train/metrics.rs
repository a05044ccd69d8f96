//! Classification accuracy metrics

use ndarray::ArrayView2;

/// Top-k accuracy: fraction of rows whose true label is among the k
/// highest-scored classes
///
/// `k` is clamped to the class count. Ties are broken by class index, which
/// only matters for pathological all-equal logits.
pub fn topk_accuracy(logits: ArrayView2<'_, f32>, targets: &[usize], k: usize) -> f32 {
    assert_eq!(logits.nrows(), targets.len(), "one target per logit row");
    if targets.is_empty() {
        return 0.0;
    }
    let k = k.min(logits.ncols()).max(1);

    let mut correct = 0usize;
    for (row, &target) in logits.rows().into_iter().zip(targets) {
        let target_score = row[target];
        // The target is in the top k iff fewer than k classes strictly beat
        // it (ranking equal scores by index, lower index first)
        let rank = row
            .iter()
            .enumerate()
            .filter(|&(c, &score)| score > target_score || (score == target_score && c < target))
            .count();
        if rank < k {
            correct += 1;
        }
    }

    correct as f32 / targets.len() as f32
}


#[cfg(test)]
mod proptests {
    use super::*;
    use ndarray::Array2;
    use proptest::prelude::*;

    proptest! {
        /// Top-k accuracy is monotone in k and bounded by [0, 1]
        #[test]
        fn topk_monotone_in_k(
            nc in 2usize..8,
            rows in 1usize..8,
            seed in 0u32..1000,
        ) {
            let logits = Array2::from_shape_fn((rows, nc), |(b, c)| {
                ((b * 31 + c * 17 + seed as usize) as f32 * 0.61).sin()
            });
            let targets: Vec<usize> = (0..rows).map(|b| (b + seed as usize) % nc).collect();

            let mut prev = 0.0f32;
            for k in 1..=nc {
                let acc = topk_accuracy(logits.view(), &targets, k);
                prop_assert!((0.0..=1.0).contains(&acc));
                prop_assert!(acc >= prev - 1e-6);
                prev = acc;
            }
            // At k = class count every target is covered
            prop_assert!((prev - 1.0).abs() < 1e-6);
        }
    }
}
