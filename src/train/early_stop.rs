//! Early stopping on validation accuracy

/// Decision after observing one epoch's validation accuracy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopDecision {
    /// Validation top-1 improved; patience was reset
    Improved,
    /// No improvement, but patience remains
    Continue,
    /// Patience is exhausted; the member's training loop must stop now
    Stop,
}

/// Tracks best validation accuracy and the remaining patience for one member
///
/// The counter starts at `patience`, resets to `patience` whenever top-1
/// strictly improves, decrements otherwise, and never goes below zero.
/// Best top-1/top-5 are monotone maxima updated on every observation,
/// including the stopping one.
#[derive(Clone, Debug)]
pub struct EarlyStopMonitor {
    patience: usize,
    counter: usize,
    best_top1: f32,
    best_top5: f32,
}

impl EarlyStopMonitor {
    /// Create a monitor with the given patience (must be >= 1)
    pub fn new(patience: usize) -> Self {
        assert!(patience > 0, "patience must be >= 1");
        Self { patience, counter: patience, best_top1: 0.0, best_top5: 0.0 }
    }

    /// Fold in one epoch's validation accuracies
    pub fn observe(&mut self, top1: f32, top5: f32) -> StopDecision {
        let improved = top1 > self.best_top1;
        let decision = if improved {
            self.counter = self.patience;
            StopDecision::Improved
        } else {
            self.counter = self.counter.saturating_sub(1);
            if self.counter == 0 {
                StopDecision::Stop
            } else {
                StopDecision::Continue
            }
        };

        self.best_top1 = self.best_top1.max(top1);
        self.best_top5 = self.best_top5.max(top5);
        decision
    }

    /// Best validation top-1 seen so far
    pub fn best_top1(&self) -> f32 {
        self.best_top1
    }

    /// Best validation top-5 seen so far
    pub fn best_top5(&self) -> f32 {
        self.best_top5
    }

    /// Epochs of patience remaining
    pub fn remaining(&self) -> usize {
        self.counter
    }
}
