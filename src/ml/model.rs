//! Result of a grid search: the chosen configuration and its refitted pipeline.

use serde::{Deserialize, Serialize};

use super::grid_search::CandidateScore;
use super::multi_output::BinaryClassifier;
use super::pipeline::{PipelineParams, TextPipeline};
use crate::dataset::LabelMatrix;

/// Version written into every persisted model.
pub const MODEL_VERSION: u32 = 1;

/// Fitted multi-label classifier together with the search that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub model_version: u32,
    /// Winning grid configuration.
    pub chosen: PipelineParams,
    /// Cross-validation scores of every candidate, in grid order.
    pub cv_results: Vec<CandidateScore>,
    pub category_names: Vec<String>,
    pub pipeline: TextPipeline,
}

impl TrainedModel {
    pub fn new(
        chosen: PipelineParams,
        cv_results: Vec<CandidateScore>,
        category_names: Vec<String>,
        pipeline: TextPipeline,
    ) -> Self {
        Self {
            model_version: MODEL_VERSION,
            chosen,
            cv_results,
            category_names,
            pipeline,
        }
    }

    /// Predict every category for each message.
    pub fn predict(&self, messages: &[String]) -> LabelMatrix {
        self.pipeline.predict(messages)
    }

    /// Names of the categories predicted for one message, in category order.
    pub fn predict_categories(&self, message: &str) -> Vec<&str> {
        let predicted = self.predict(&[message.to_string()]);
        self.category_names
            .iter()
            .zip(predicted.row(0))
            .filter(|(_, label)| **label == 1)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Check the structural invariants of a deserialized model.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_version != MODEL_VERSION {
            return Err(format!(
                "Unsupported model_version {} (expected {MODEL_VERSION})",
                self.model_version
            ));
        }
        let categories = &self.pipeline.classifier.categories;
        if categories.len() != self.category_names.len() {
            return Err(format!(
                "{} classifiers but {} category names",
                categories.len(),
                self.category_names.len()
            ));
        }
        for (entry, name) in categories.iter().zip(&self.category_names) {
            if &entry.category != name {
                return Err(format!(
                    "Classifier for `{}` found where `{name}` was expected",
                    entry.category
                ));
            }
            if let BinaryClassifier::Constant { label } = entry.classifier {
                if label > 1 {
                    return Err(format!("Category `{name}` has non-binary constant label {label}"));
                }
            }
        }
        self.pipeline.vectorizer.validate()?;
        let vocabulary = self.pipeline.vocabulary_size();
        if self.pipeline.tfidf.idf().len() != vocabulary {
            return Err(format!(
                "idf has {} weights for a vocabulary of {vocabulary}",
                self.pipeline.tfidf.idf().len()
            ));
        }
        if let Some(entry) = categories
            .iter()
            .find(|entry| entry.classifier.feature_len().is_some_and(|len| len != vocabulary))
        {
            return Err(format!(
                "Category `{}` has {} weights for a vocabulary of {vocabulary}",
                entry.category,
                entry.classifier.feature_len().unwrap_or_default()
            ));
        }
        if self.pipeline.tfidf.smooth_idf() != self.chosen.smooth_idf {
            return Err("idf smoothing does not match the chosen configuration".to_string());
        }
        Ok(())
    }
}
