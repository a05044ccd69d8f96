//! Ensemble training loop for fixed-architecture image classifiers
//!
//! Conjunto trains a set of classifiers whose architectures were already
//! decided by an external search process: one opaque descriptor file per
//! member, one independent training run per member, strictly in sequence.
//! Each run is plain supervised learning (forward/backward over shuffled
//! batches, Adam with global-norm gradient clipping, an optional
//! auxiliary-loss term, a linear drop-path ramp, and early stopping on
//! validation top-1) with per-step scalar events streamed to a per-member
//! run directory.
//!
//! The crate does no architecture search, no descriptor parsing, and no
//! dataset construction; those live behind the [`model::ModelFactory`] and
//! [`data::Dataset`] seams.
//!
//! # Example
//!
//! ```no_run
//! use conjunto::config::{Cli, EnsembleConfig};
//! use conjunto::data::InMemoryDataset;
//! use conjunto::model::AffineFactory;
//! use conjunto::train::EnsembleDriver;
//! use clap::Parser;
//!
//! # fn main() -> conjunto::error::Result<()> {
//! let cli = Cli::try_parse_from(["conjunto", "--models", "2", "--epochs", "20"]).unwrap();
//! let driver = EnsembleDriver::new(EnsembleConfig::from(cli))?;
//!
//! let dataset = InMemoryDataset::synthetic(512, 128, 3072, 10, 96, 666);
//! let factory = AffineFactory::new(3072, 10, true, 666);
//!
//! for result in driver.run(&factory, &dataset)? {
//!     println!("member {}: best Prec@1 {:.2}%", result.ordinal, result.best_top1 * 100.0);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod loss;
pub mod model;
pub mod optim;
pub mod params;
pub mod tracking;
pub mod train;

pub use config::EnsembleConfig;
pub use error::{EnsembleError, Result};
pub use params::Parameter;
pub use train::{EnsembleDriver, MemberResult};
