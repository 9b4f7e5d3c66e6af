//! Error taxonomy for the training pipeline.
//!
//! Every stage returns [`TriageError`]; nothing is caught or retried, so the first failure
//! propagates to the binary and terminates the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::text::lemma::LemmaError;

/// Convenience alias used across the crate.
pub type Result<T, E = TriageError> = std::result::Result<T, E>;

/// Failure classes of a training run.
#[derive(Debug, Error)]
pub enum TriageError {
    /// The data source is unreachable or the requested table is missing.
    #[error("data access failed: {0}")]
    DataAccess(String),
    /// Shapes of messages, targets, predictions or category names disagree.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The underlying fit failed (empty vocabulary, empty training set, ...).
    #[error("training failed: {0}")]
    Training(String),
    /// Reading or writing a file failed.
    #[error("io error at {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Training settings could not be loaded or are out of range.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Linguistic resources could not be loaded at startup.
    #[error(transparent)]
    Resource(#[from] LemmaError),
}

impl TriageError {
    pub fn validation(message: impl Into<String>) -> Self {
        TriageError::Validation(message.into())
    }

    pub fn training(message: impl Into<String>) -> Self {
        TriageError::Training(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TriageError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<rusqlite::Error> for TriageError {
    fn from(err: rusqlite::Error) -> Self {
        TriageError::DataAccess(err.to_string())
    }
}
