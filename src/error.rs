//! Crate-wide error type
//!
//! There is deliberately no recovery path: any failure (missing descriptor,
//! bad configuration, I/O trouble while writing events) aborts the whole
//! ensemble run through the binary's error path. Early stopping is not an
//! error; it is a planned termination handled inside the driver.

use std::path::PathBuf;

/// Errors from ensemble training operations
#[derive(Debug, thiserror::Error)]
pub enum EnsembleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("architecture descriptor not found: {}", .0.display())]
    DescriptorNotFound(PathBuf),

    #[error("model predicts {model} classes but the dataset has {dataset}")]
    ClassCountMismatch { model: usize, dataset: usize },

    #[error("dataset yielded no batches")]
    EmptyDataset,
}

/// Result alias for ensemble training operations
pub type Result<T> = std::result::Result<T, EnsembleError>;
