//! Per-epoch training and validation loops plus the ensemble driver
//!
//! Control flow: [`EnsembleDriver`] → per member → per epoch
//! { [`train_epoch`] → [`validate_epoch`] → early-stop decision }. Members
//! are trained strictly one after another; each owns its model, optimizer,
//! and early-stop state exclusively.

mod driver;
mod early_stop;
mod meter;
mod metrics;
mod trainer;
mod validator;

pub use driver::{drop_path_prob_at, EnsembleDriver, MemberResult};
pub use early_stop::{EarlyStopMonitor, StopDecision};
pub use meter::AverageMeter;
pub use metrics::topk_accuracy;
pub use trainer::{train_epoch, EpochStats};
pub use validator::validate_epoch;
