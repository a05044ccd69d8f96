//! Gradient clipping utilities

use crate::params::Parameter;

/// Clip gradients by global norm
///
/// Computes the global L2 norm across every parameter's gradient and scales
/// all gradients down when the norm exceeds `max_norm`, preserving their
/// relative magnitudes.
///
/// Algorithm:
/// 1. global_norm = sqrt(sum of all gradient squared norms)
/// 2. If global_norm > max_norm:
///    - clip_coef = max_norm / global_norm
///    - For each gradient: grad *= clip_coef
///
/// # Returns
/// The global norm before clipping
pub fn clip_grad_norm(params: &mut [&mut Parameter], max_norm: f32) -> f32 {
    let mut total_norm_sq = 0.0;

    for param in params.iter() {
        if let Some(grad) = param.grad() {
            let grad_norm_sq: f32 = grad.iter().map(|&g| g * g).sum();
            total_norm_sq += grad_norm_sq;
        }
    }

    let global_norm = total_norm_sq.sqrt();

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;

        for param in params.iter_mut() {
            if let Some(grad) = param.grad_mut() {
                grad.mapv_inplace(|g| g * clip_coef);
            }
        }
    }

    global_norm
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// After clipping, the global norm never exceeds max_norm
        #[test]
        fn clipped_norm_bounded(
            grads in proptest::collection::vec(-100.0f32..100.0, 1..16),
            max_norm in 0.1f32..10.0,
        ) {
            let mut p = Parameter::zeros(grads.len());
            p.accumulate_grad(&ndarray::Array1::from(grads));

            clip_grad_norm(&mut [&mut p], max_norm);

            let norm: f32 = p.grad().unwrap().iter().map(|&g| g * g).sum::<f32>().sqrt();
            prop_assert!(norm <= max_norm * (1.0 + 1e-4));
        }
    }
}
