//! sf-results: on-disk checkpoints, products and timeseries.

pub mod hash;
pub mod store;
pub mod types;

pub use hash::config_fingerprint;
pub use store::{FileSink, OutputDir, resume};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] sf_archive::ArchiveError),

    #[error("Run failed: {0}")]
    Sim(#[from] sf_sim::SimError),

    #[error("Checkpoint not found: {path}")]
    CheckpointNotFound { path: String },

    #[error("Cannot tell the archive format of {path}")]
    UnknownFormat { path: String },
}
