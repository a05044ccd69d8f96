//! Model seam
//!
//! Architectures come out of an external search process as opaque descriptor
//! files; this crate never looks inside one. A [`ModelFactory`] turns a
//! descriptor path into a ready-to-train [`ImageClassifier`], and the
//! training loop drives the model exclusively through that trait.
//!
//! The forward pass is split into two methods rather than one mode-dependent
//! call: [`ImageClassifier::forward_train`] yields primary plus optional
//! auxiliary logits, [`ImageClassifier::forward_eval`] yields primary logits
//! only.

mod affine;

pub use affine::{AffineClassifier, AffineFactory};

use std::path::Path;

use ndarray::Array2;

use crate::error::Result;
use crate::params::Parameter;

/// Output of a training-mode forward pass
#[derive(Debug, Clone)]
pub struct TrainForward {
    /// `[batch, classes]` primary logits
    pub logits: Array2<f32>,
    /// `[batch, classes]` auxiliary-head logits, for architectures that
    /// carry an auxiliary classifier
    pub aux_logits: Option<Array2<f32>>,
}

/// A trainable classifier with a fixed architecture
///
/// `backward` must be preceded by `forward_train` on the same batch: the
/// model caches whatever activations and stochastic masks it needs, and the
/// gradients it produces land in its own [`Parameter`] buffers.
pub trait ImageClassifier {
    /// Training-mode forward pass: primary and (if present) auxiliary logits
    fn forward_train(&mut self, inputs: &Array2<f32>) -> TrainForward;

    /// Evaluation-mode forward pass: primary logits only, no state change
    fn forward_eval(&self, inputs: &Array2<f32>) -> Array2<f32>;

    /// Accumulate parameter gradients from logit gradients
    ///
    /// `grad_aux` is ignored by architectures without an auxiliary head.
    fn backward(&mut self, grad_logits: &Array2<f32>, grad_aux: Option<&Array2<f32>>);

    /// Borrow every trainable parameter, in a stable order
    fn parameters(&mut self) -> Vec<&mut Parameter>;

    /// Set the stochastic path-dropping intensity for subsequent training
    /// forward passes
    fn set_drop_path_prob(&mut self, prob: f32);

    /// Number of output classes
    fn num_classes(&self) -> usize;
}

/// Builds a classifier from an architecture descriptor file
///
/// The descriptor's format belongs to the external search tool; implementors
/// may hand the path to that tool, but the training loop only ever sees the
/// finished model.
pub trait ModelFactory {
    fn build(&self, descriptor: &Path) -> Result<Box<dyn ImageClassifier>>;
}
