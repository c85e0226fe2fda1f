use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The dataset file is a hard startup requirement.
    #[error("dataset not found at {}", .0.display())]
    DatasetMissing(PathBuf),

    #[error("dataset parse error: {0}")]
    Dataset(#[from] csv::Error),

    #[error("product '{0}' not found")]
    NotFound(String),
}
