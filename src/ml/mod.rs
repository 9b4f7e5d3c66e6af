//! Text classification model: features, classifiers, search, evaluation and persistence.
//!
//! Everything here works on sparse TF-IDF rows so memory stays proportional to the number
//! of tokens rather than the vocabulary size.

pub mod grid_search;
pub mod metrics;
pub mod model;
pub mod multi_output;
pub mod persist;
pub mod pipeline;
pub mod report;
pub mod svm;
pub mod vectorize;

pub use grid_search::{CandidateScore, GridSearch, ParamGrid};
pub use model::{MODEL_VERSION, TrainedModel};
pub use persist::{load_model, save_model};
pub use pipeline::{PipelineParams, TextPipeline};
pub use report::{EvaluationReport, build_report, evaluate};
pub use svm::SvmSettings;
