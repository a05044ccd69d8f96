//! Trainable parameter storage
//!
//! A [`Parameter`] is a flat vector of weights plus an optional gradient
//! buffer of the same length. Models own their parameters and fill the
//! gradient buffers during their backward pass; the optimizer and gradient
//! clipping then operate on borrowed references collected from the model.

use ndarray::Array1;

/// A trainable vector with an optional gradient buffer
#[derive(Debug, Clone)]
pub struct Parameter {
    data: Array1<f32>,
    grad: Option<Array1<f32>>,
}

impl Parameter {
    /// Create a parameter from raw weights
    pub fn new(data: Array1<f32>) -> Self {
        Self { data, grad: None }
    }

    /// Create a parameter from a `Vec`
    pub fn from_vec(data: Vec<f32>) -> Self {
        Self::new(Array1::from(data))
    }

    /// Create a zero-initialized parameter of the given length
    pub fn zeros(len: usize) -> Self {
        Self::new(Array1::zeros(len))
    }

    /// Number of weights
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the parameter holds no weights
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the weights
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutate the weights (optimizer step)
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Read the gradient, if one has been accumulated since the last zeroing
    pub fn grad(&self) -> Option<&Array1<f32>> {
        self.grad.as_ref()
    }

    /// Mutate the gradient in place (gradient clipping)
    pub fn grad_mut(&mut self) -> Option<&mut Array1<f32>> {
        self.grad.as_mut()
    }

    /// Add a gradient contribution, initializing the buffer on first use
    ///
    /// # Panics
    /// Panics if `grad` has a different length than the parameter.
    pub fn accumulate_grad(&mut self, grad: &Array1<f32>) {
        assert_eq!(grad.len(), self.data.len(), "gradient length must match parameter length");
        match self.grad.as_mut() {
            Some(existing) => *existing += grad,
            None => self.grad = Some(grad.clone()),
        }
    }

    /// Drop the accumulated gradient
    pub fn zero_grad(&mut self) {
        self.grad = None;
    }
}
