//! Dataset seam
//!
//! Real datasets (decoding, normalization, cutout augmentation, worker
//! pools) live behind the [`Dataset`] trait in an external provider; the
//! training loop only sees batches of flattened image rows with integer
//! labels. The in-memory implementation in [`memory`] exists for the demo
//! binary and for tests.

mod memory;

pub use memory::InMemoryDataset;

use ndarray::Array2;
use rand::rngs::StdRng;

/// A batch of flattened images with one integer label per row
#[derive(Debug, Clone)]
pub struct ImageBatch {
    /// `[batch, features]` image rows
    pub images: Array2<f32>,
    /// True class per row
    pub labels: Vec<usize>,
}

impl ImageBatch {
    /// Create a batch
    ///
    /// # Panics
    /// Panics if the label count does not match the image row count.
    pub fn new(images: Array2<f32>, labels: Vec<usize>) -> Self {
        assert_eq!(images.nrows(), labels.len(), "one label per image row");
        Self { images, labels }
    }

    /// Number of examples in the batch
    pub fn size(&self) -> usize {
        self.labels.len()
    }
}

/// Provider of training and validation batches
///
/// Training batches are reshuffled per epoch with the caller's RNG so a
/// member's whole stochastic trajectory is governed by its seed; validation
/// batches keep a fixed order.
pub trait Dataset {
    /// One epoch of training batches, shuffled with `rng`
    fn train_batches(&self, rng: &mut StdRng) -> Vec<ImageBatch>;

    /// One epoch of validation batches, fixed order
    fn valid_batches(&self) -> Vec<ImageBatch>;

    /// Flattened image width
    fn feature_dim(&self) -> usize;

    /// Number of label classes
    fn num_classes(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_batch_size() {
        let batch = ImageBatch::new(Array2::zeros((3, 4)), vec![0, 1, 2]);
        assert_eq!(batch.size(), 3);
    }

    #[test]
    #[should_panic(expected = "one label per image row")]
    fn test_image_batch_label_mismatch() {
        ImageBatch::new(Array2::zeros((3, 4)), vec![0, 1]);
    }
}
