//! Adam optimizer

use ndarray::Array1;

use super::Optimizer;
use crate::params::Parameter;

/// Adam optimizer with bias-corrected first and second moments
///
/// Update rule:
///   m_t = β₁·m_{t-1} + (1-β₁)·g
///   v_t = β₂·v_{t-1} + (1-β₂)·g²
///   θ_t = θ_{t-1} - lr_t · m_t / (√v_t + ε)
/// where lr_t folds the bias-correction factors into the learning rate.
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>, // First moment
    v: Vec<Option<Array1<f32>>>, // Second moment
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self { lr, beta1, beta2, epsilon, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Adam with the usual defaults (β₁ = 0.9, β₂ = 0.999, ε = 1e-8)
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }

    /// Number of optimization steps taken
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    fn ensure_moments(&mut self, count: usize) {
        if self.m.is_empty() {
            self.m = (0..count).map(|_| None).collect();
            self.v = (0..count).map(|_| None).collect();
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        self.ensure_moments(params.len());
        self.t += 1;

        // Fold bias correction into the step size
        let lr_t = self.lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)));

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad().cloned() else { continue };

            let m = self.m[i].get_or_insert_with(|| Array1::zeros(grad.len()));
            let v = self.v[i].get_or_insert_with(|| Array1::zeros(grad.len()));

            let data = param.data_mut();
            for j in 0..grad.len() {
                m[j] = self.beta1 * m[j] + (1.0 - self.beta1) * grad[j];
                v[j] = self.beta2 * v[j] + (1.0 - self.beta2) * grad[j] * grad[j];
                data[j] -= lr_t * m[j] / (v[j].sqrt() + self.epsilon);
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}
