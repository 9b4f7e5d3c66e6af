//! Multi-label classifier for disaster-response messages.
//!
//! Messages and their category labels are read from SQLite, turned into TF-IDF features
//! and fitted with one linear SVM per category. A small grid search picks the feature and
//! regularization settings; the winner is evaluated on held-out rows and saved as JSON.

/// Locations of the settings file and run logs.
pub mod app_dirs;
/// Training settings.
pub mod config;
/// Loading, labels and splitting of the message corpus.
pub mod dataset;
/// Error taxonomy.
pub mod error;
/// Tracing setup.
pub mod logging;
/// Features, classifiers, search, evaluation and persistence.
pub mod ml;
/// Tokenization and lemmatization.
pub mod text;
/// Stage-by-stage training run.
pub mod train;
