//! Count vectorizer, TF-IDF weighting and per-category SVMs chained into one estimator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::multi_output::MultiOutputClassifier;
use super::svm::SvmSettings;
use super::vectorize::{CountVectorizer, SparseRow, TfidfTransformer};
use crate::dataset::LabelMatrix;
use crate::error::Result;
use crate::text::Tokenizer;

/// Hyperparameters searched by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Add one to document frequencies when computing idf.
    pub smooth_idf: bool,
    /// Inverse regularization strength of every category SVM.
    pub c: f64,
}

impl std::fmt::Display for PipelineParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "smooth_idf={} C={}", self.smooth_idf, self.c)
    }
}

/// Fitted text classification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPipeline {
    pub vectorizer: CountVectorizer,
    pub tfidf: TfidfTransformer,
    pub classifier: MultiOutputClassifier,
}

impl TextPipeline {
    /// Learn vocabulary, idf weights and one classifier per category from `messages`.
    pub fn fit(
        tokenizer: &Tokenizer,
        messages: &[String],
        targets: &LabelMatrix,
        category_names: &[String],
        params: &PipelineParams,
        svm: &SvmSettings,
    ) -> Result<Self> {
        let vectorizer = CountVectorizer::fit(tokenizer, messages)?;
        let n_features = vectorizer.vocabulary_size();
        let counts = vectorizer.transform(messages);
        let tfidf = TfidfTransformer::fit(&counts, n_features, params.smooth_idf);
        let features = tfidf.transform(counts);
        debug!(
            "Fitting {} categories on {} rows x {n_features} features ({params})",
            category_names.len(),
            features.len()
        );
        let classifier =
            MultiOutputClassifier::fit(&features, targets, category_names, n_features, params.c, svm)?;
        Ok(Self {
            vectorizer,
            tfidf,
            classifier,
        })
    }

    /// TF-IDF rows for `messages` using the fitted vocabulary.
    pub fn features(&self, messages: &[String]) -> Vec<SparseRow> {
        self.tfidf.transform(self.vectorizer.transform(messages))
    }

    pub fn predict(&self, messages: &[String]) -> LabelMatrix {
        self.classifier.predict(&self.features(messages))
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    pub fn category_names(&self) -> Vec<String> {
        self.classifier.category_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Lemmatizer;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pipeline_learns_keyword_categories() {
        let tokenizer = Tokenizer::new(Lemmatizer::embedded().unwrap());
        let messages = strings(&[
            "we need water please",
            "clean water needed here",
            "no food left in camp",
            "send food for children",
            "water and food both gone",
            "roads are blocked",
        ]);
        let targets = LabelMatrix::from_columns(
            6,
            &[vec![1, 1, 0, 0, 1, 0], vec![0, 0, 1, 1, 1, 0]],
        )
        .unwrap();
        let names = strings(&["water", "food"]);
        let params = PipelineParams {
            smooth_idf: true,
            c: 1.0,
        };
        let pipeline =
            TextPipeline::fit(&tokenizer, &messages, &targets, &names, &params, &SvmSettings::default())
                .unwrap();
        assert_eq!(pipeline.category_names(), names);
        assert_eq!(pipeline.predict(&messages), targets);
        let unseen = pipeline.predict(&strings(&["Water!", "FOOD"]));
        assert_eq!(unseen.row(0), &[1, 0]);
        assert_eq!(unseen.row(1), &[0, 1]);
    }
}
