//! Reference affine classifier
//!
//! A single affine layer with softmax training via [`crate::loss`], plus an
//! optional auxiliary head sharing the (path-dropped) features. It stands in
//! for search-produced convolutional architectures in the demo binary and in
//! tests; real deployments implement [`ModelFactory`] around the external
//! search tool's own model builder.
//!
//! Drop-path is realized as stochastic feature dropping: during a training
//! forward pass each input column is kept with probability `1 - p` and
//! scaled by `1/(1 - p)`, so evaluation needs no rescaling.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ImageClassifier, ModelFactory, TrainForward};
use crate::error::{EnsembleError, Result};
use crate::params::Parameter;

struct ForwardCache {
    /// Inputs after the drop-path mask was applied
    masked_inputs: Array2<f32>,
}

/// Affine classifier with an optional auxiliary head
pub struct AffineClassifier {
    in_features: usize,
    num_classes: usize,
    /// `[classes * features]`, row-major by class
    weight: Parameter,
    bias: Parameter,
    aux_weight: Option<Parameter>,
    aux_bias: Option<Parameter>,
    drop_path_prob: f32,
    rng: StdRng,
    cache: Option<ForwardCache>,
}

impl AffineClassifier {
    /// Create with small uniform random weights drawn from the seed
    pub fn new(in_features: usize, num_classes: usize, with_aux: bool, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let bound = 1.0 / (in_features as f32).sqrt();
        let init = |len: usize, rng: &mut StdRng| {
            Parameter::new(Array1::from_iter((0..len).map(|_| rng.random_range(-bound..bound))))
        };

        let weight = init(num_classes * in_features, &mut rng);
        let bias = Parameter::zeros(num_classes);
        let (aux_weight, aux_bias) = if with_aux {
            (Some(init(num_classes * in_features, &mut rng)), Some(Parameter::zeros(num_classes)))
        } else {
            (None, None)
        };

        Self {
            in_features,
            num_classes,
            weight,
            bias,
            aux_weight,
            aux_bias,
            drop_path_prob: 0.0,
            rng,
            cache: None,
        }
    }

    /// Whether the model carries an auxiliary head
    pub fn has_aux(&self) -> bool {
        self.aux_weight.is_some()
    }

    /// Current path-dropping probability
    pub fn drop_path_prob(&self) -> f32 {
        self.drop_path_prob
    }

    fn affine(&self, inputs: &Array2<f32>, weight: &Parameter, bias: &Parameter) -> Array2<f32> {
        assert_eq!(inputs.ncols(), self.in_features, "input width must match the model");
        let nf = self.in_features;
        let mut logits = Array2::zeros((inputs.nrows(), self.num_classes));
        for b in 0..inputs.nrows() {
            let row = inputs.row(b);
            for c in 0..self.num_classes {
                let w = weight.data().slice(s![c * nf..(c + 1) * nf]);
                logits[[b, c]] = row.dot(&w) + bias.data()[c];
            }
        }
        logits
    }

    fn head_grads(
        masked_inputs: &Array2<f32>,
        grad_logits: &Array2<f32>,
        in_features: usize,
        num_classes: usize,
    ) -> (Array1<f32>, Array1<f32>) {
        let mut dw = Array1::zeros(num_classes * in_features);
        let mut db = Array1::zeros(num_classes);
        for b in 0..masked_inputs.nrows() {
            for c in 0..num_classes {
                let g = grad_logits[[b, c]];
                if g == 0.0 {
                    continue;
                }
                db[c] += g;
                for j in 0..in_features {
                    dw[c * in_features + j] += g * masked_inputs[[b, j]];
                }
            }
        }
        (dw, db)
    }
}

impl ImageClassifier for AffineClassifier {
    fn forward_train(&mut self, inputs: &Array2<f32>) -> TrainForward {
        let mut masked = inputs.clone();
        if self.drop_path_prob > 0.0 {
            let keep = 1.0 - self.drop_path_prob;
            let mask = Array1::from_iter(
                (0..self.in_features)
                    .map(|_| if self.rng.random::<f32>() < keep { 1.0 / keep } else { 0.0 }),
            );
            for mut row in masked.rows_mut() {
                row *= &mask;
            }
        }

        let logits = self.affine(&masked, &self.weight, &self.bias);
        let aux_logits = match (&self.aux_weight, &self.aux_bias) {
            (Some(w), Some(b)) => Some(self.affine(&masked, w, b)),
            _ => None,
        };

        self.cache = Some(ForwardCache { masked_inputs: masked });
        TrainForward { logits, aux_logits }
    }

    fn forward_eval(&self, inputs: &Array2<f32>) -> Array2<f32> {
        self.affine(inputs, &self.weight, &self.bias)
    }

    fn backward(&mut self, grad_logits: &Array2<f32>, grad_aux: Option<&Array2<f32>>) {
        let cache = self.cache.take().expect("backward requires a preceding forward_train");

        let (dw, db) =
            Self::head_grads(&cache.masked_inputs, grad_logits, self.in_features, self.num_classes);
        self.weight.accumulate_grad(&dw);
        self.bias.accumulate_grad(&db);

        if let (Some(grad), Some(aux_w), Some(aux_b)) =
            (grad_aux, self.aux_weight.as_mut(), self.aux_bias.as_mut())
        {
            let (dw, db) =
                Self::head_grads(&cache.masked_inputs, grad, self.in_features, self.num_classes);
            aux_w.accumulate_grad(&dw);
            aux_b.accumulate_grad(&db);
        }
    }

    fn parameters(&mut self) -> Vec<&mut Parameter> {
        let mut params = vec![&mut self.weight, &mut self.bias];
        if let Some(w) = self.aux_weight.as_mut() {
            params.push(w);
        }
        if let Some(b) = self.aux_bias.as_mut() {
            params.push(b);
        }
        params
    }

    fn set_drop_path_prob(&mut self, prob: f32) {
        self.drop_path_prob = prob.clamp(0.0, 0.999);
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }
}

/// Factory building [`AffineClassifier`]s, one per descriptor file
///
/// The descriptor's contents are not read; its presence is required and its
/// path perturbs the weight-initialization seed so distinct members start
/// from distinct weights even under a shared training seed.
pub struct AffineFactory {
    in_features: usize,
    num_classes: usize,
    with_aux: bool,
    init_seed: u64,
}

impl AffineFactory {
    pub fn new(in_features: usize, num_classes: usize, with_aux: bool, init_seed: u64) -> Self {
        Self { in_features, num_classes, with_aux, init_seed }
    }

    fn seed_for(&self, descriptor: &Path) -> u64 {
        let mut hasher = DefaultHasher::new();
        descriptor.hash(&mut hasher);
        self.init_seed ^ hasher.finish()
    }
}

impl ModelFactory for AffineFactory {
    fn build(&self, descriptor: &Path) -> Result<Box<dyn ImageClassifier>> {
        if !descriptor.is_file() {
            return Err(EnsembleError::DescriptorNotFound(descriptor.to_path_buf()));
        }
        Ok(Box::new(AffineClassifier::new(
            self.in_features,
            self.num_classes,
            self.with_aux,
            self.seed_for(descriptor),
        )))
    }
}
