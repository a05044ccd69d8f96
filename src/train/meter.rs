//! Running weighted-average meter

/// Running weighted average of a scalar stream
///
/// Each observation carries a weight (here: the batch size), so per-batch
/// values aggregate into an exact per-example epoch mean regardless of a
/// ragged final batch.
#[derive(Debug, Clone)]
pub struct AverageMeter {
    name: &'static str,
    sum: f64,
    count: f64,
}

impl AverageMeter {
    /// Create an empty meter
    pub fn new(name: &'static str) -> Self {
        Self { name, sum: 0.0, count: 0.0 }
    }

    /// Fold in an observation with a positive weight
    pub fn update(&mut self, value: f32, weight: usize) {
        debug_assert!(weight > 0, "meter weights must be positive");
        self.sum += f64::from(value) * weight as f64;
        self.count += weight as f64;
    }

    /// Current weighted mean; 0 before the first update
    pub fn average(&self) -> f32 {
        if self.count == 0.0 {
            0.0
        } else {
            (self.sum / self.count) as f32
        }
    }

    /// Meter name, for logging
    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_single_update_returns_value() {
        let mut meter = AverageMeter::new("loss");
        meter.update(0.75, 96);
        assert_abs_diff_eq!(meter.average(), 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_weighted_mean() {
        let mut meter = AverageMeter::new("acc1");
        meter.update(1.0, 3);
        meter.update(0.0, 1);
        assert_abs_diff_eq!(meter.average(), 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_equal_weights_reduce_to_plain_mean() {
        let mut meter = AverageMeter::new("loss");
        for v in [1.0, 2.0, 3.0, 4.0] {
            meter.update(v, 8);
        }
        assert_abs_diff_eq!(meter.average(), 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_meter_reads_zero() {
        let meter = AverageMeter::new("acc5");
        assert_eq!(meter.average(), 0.0);
        assert_eq!(meter.name(), "acc5");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// average equals Σ(vᵢ·wᵢ)/Σ(wᵢ) for any observation stream
        #[test]
        fn average_matches_closed_form(
            observations in proptest::collection::vec((-100.0f32..100.0, 1usize..256), 1..32),
        ) {
            let mut meter = AverageMeter::new("test");
            let mut sum = 0.0f64;
            let mut count = 0.0f64;
            for &(v, w) in &observations {
                meter.update(v, w);
                sum += f64::from(v) * w as f64;
                count += w as f64;
            }
            let expected = (sum / count) as f32;
            prop_assert!((meter.average() - expected).abs() <= 1e-4 * expected.abs().max(1.0));
        }
    }
}
