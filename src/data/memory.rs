//! In-memory dataset
//!
//! Holds every example in RAM and batches on demand. Used by the demo
//! binary (with synthetically generated class clusters) and by tests; a
//! production run substitutes a real provider behind the same trait.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{Dataset, ImageBatch};

/// Dataset held fully in memory
pub struct InMemoryDataset {
    train: Vec<(Array1<f32>, usize)>,
    valid: Vec<(Array1<f32>, usize)>,
    batch_size: usize,
    feature_dim: usize,
    num_classes: usize,
}

impl InMemoryDataset {
    /// Create from pre-built example lists
    ///
    /// # Panics
    /// Panics if `batch_size` is zero or either split is empty.
    pub fn new(
        train: Vec<(Array1<f32>, usize)>,
        valid: Vec<(Array1<f32>, usize)>,
        batch_size: usize,
        feature_dim: usize,
        num_classes: usize,
    ) -> Self {
        assert!(batch_size > 0, "batch_size must be >= 1");
        assert!(!train.is_empty() && !valid.is_empty(), "both splits must be non-empty");
        Self { train, valid, batch_size, feature_dim, num_classes }
    }

    /// Deterministic synthetic dataset: one noisy cluster center per class
    ///
    /// Each example is its class center plus uniform noise, so a linear
    /// model can separate the classes and accuracy actually moves during a
    /// demo run. The same seed always produces the same examples.
    pub fn synthetic(
        n_train: usize,
        n_valid: usize,
        feature_dim: usize,
        num_classes: usize,
        batch_size: usize,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let centers: Vec<Array1<f32>> = (0..num_classes)
            .map(|_| Array1::from_iter((0..feature_dim).map(|_| rng.random_range(-1.0f32..1.0))))
            .collect();

        let sample = |rng: &mut StdRng| {
            let label = rng.random_range(0..num_classes);
            let noise = Array1::from_iter((0..feature_dim).map(|_| rng.random_range(-0.3f32..0.3)));
            (&centers[label] + &noise, label)
        };

        let train = (0..n_train).map(|_| sample(&mut rng)).collect();
        let valid = (0..n_valid).map(|_| sample(&mut rng)).collect();
        Self::new(train, valid, batch_size, feature_dim, num_classes)
    }

    fn batches_of(&self, examples: &[(Array1<f32>, usize)], order: &[usize]) -> Vec<ImageBatch> {
        order
            .chunks(self.batch_size)
            .map(|chunk| {
                let mut images = Array2::zeros((chunk.len(), self.feature_dim));
                let mut labels = Vec::with_capacity(chunk.len());
                for (row, &idx) in chunk.iter().enumerate() {
                    images.row_mut(row).assign(&examples[idx].0);
                    labels.push(examples[idx].1);
                }
                ImageBatch::new(images, labels)
            })
            .collect()
    }
}

impl Dataset for InMemoryDataset {
    fn train_batches(&self, rng: &mut StdRng) -> Vec<ImageBatch> {
        let mut order: Vec<usize> = (0..self.train.len()).collect();
        order.shuffle(rng);
        self.batches_of(&self.train, &order)
    }

    fn valid_batches(&self) -> Vec<ImageBatch> {
        let order: Vec<usize> = (0..self.valid.len()).collect();
        self.batches_of(&self.valid, &order)
    }

    fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> InMemoryDataset {
        InMemoryDataset::synthetic(10, 4, 6, 3, 4, 42)
    }

    #[test]
    fn test_synthetic_shapes() {
        let ds = small();
        assert_eq!(ds.feature_dim(), 6);
        assert_eq!(ds.num_classes(), 3);

        let batches = ds.valid_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].size(), 4);
        assert_eq!(batches[0].images.ncols(), 6);
    }

    #[test]
    fn test_train_batches_cover_all_examples() {
        let ds = small();
        let mut rng = StdRng::seed_from_u64(0);
        let batches = ds.train_batches(&mut rng);
        // 10 examples, batch 4 -> 4 + 4 + 2
        assert_eq!(batches.len(), 3);
        let total: usize = batches.iter().map(ImageBatch::size).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_shuffle_is_seed_deterministic() {
        let ds = small();
        let a = ds.train_batches(&mut StdRng::seed_from_u64(7));
        let b = ds.train_batches(&mut StdRng::seed_from_u64(7));
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.labels, y.labels);
        }
    }

    #[test]
    fn test_valid_order_is_fixed() {
        let ds = small();
        let a = ds.valid_batches();
        let b = ds.valid_batches();
        assert_eq!(a[0].labels, b[0].labels);
    }

    #[test]
    fn test_synthetic_is_seed_deterministic() {
        let a = InMemoryDataset::synthetic(6, 3, 4, 2, 2, 9);
        let b = InMemoryDataset::synthetic(6, 3, 4, 2, 2, 9);
        let (xa, xb) = (a.valid_batches(), b.valid_batches());
        assert_eq!(xa[0].labels, xb[0].labels);
        assert_eq!(xa[0].images, xb[0].images);
    }

    #[test]
    #[should_panic(expected = "batch_size must be >= 1")]
    fn test_zero_batch_size_rejected() {
        InMemoryDataset::synthetic(4, 2, 3, 2, 0, 1);
    }
}
