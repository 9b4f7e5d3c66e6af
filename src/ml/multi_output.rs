//! One independent binary classifier per category.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::svm::{LinearSvc, SvmSettings, TrainOptions, train_linear_svc};
use super::vectorize::SparseRow;
use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};

/// Decision rule for a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BinaryClassifier {
    /// Learned hyperplane.
    Linear(LinearSvc),
    /// The training column held only this label.
    Constant { label: u8 },
}

impl BinaryClassifier {
    pub fn predict(&self, row: &[(u32, f64)]) -> u8 {
        match self {
            BinaryClassifier::Linear(svc) => svc.predict(row),
            BinaryClassifier::Constant { label } => *label,
        }
    }

    /// Weight vector length, or `None` for constant predictors.
    pub fn feature_len(&self) -> Option<usize> {
        match self {
            BinaryClassifier::Linear(svc) => Some(svc.weights.len()),
            BinaryClassifier::Constant { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryClassifier {
    pub category: String,
    pub classifier: BinaryClassifier,
}

/// Category name to classifier mapping, in target column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiOutputClassifier {
    pub categories: Vec<CategoryClassifier>,
}

impl MultiOutputClassifier {
    /// Fit one classifier per target column.
    ///
    /// A failing category aborts the fit with an error naming it.
    pub fn fit(
        x: &[SparseRow],
        y: &LabelMatrix,
        category_names: &[String],
        n_features: usize,
        c: f64,
        svm: &SvmSettings,
    ) -> Result<Self> {
        if x.is_empty() {
            return Err(TriageError::training("no training rows"));
        }
        if y.rows() != x.len() {
            return Err(TriageError::validation(format!(
                "{} feature rows but {} target rows",
                x.len(),
                y.rows()
            )));
        }
        if y.cols() != category_names.len() {
            return Err(TriageError::validation(format!(
                "{} target columns but {} category names",
                y.cols(),
                category_names.len()
            )));
        }

        let options = TrainOptions::new(c, svm);
        let mut categories = Vec::with_capacity(category_names.len());
        for (col, name) in category_names.iter().enumerate() {
            let labels = y.column(col);
            let classifier = if y.column_is_constant(col) {
                let label = labels[0];
                warn!("Category `{name}` has only label {label} in training data; predicting it constantly");
                BinaryClassifier::Constant { label }
            } else {
                let (svc, stats) = train_linear_svc(x, &labels, n_features, &options)
                    .map_err(|reason| TriageError::training(format!("category `{name}`: {reason}")))?;
                if !stats.converged {
                    warn!(
                        "Category `{name}` did not converge within {} iterations (C={c})",
                        stats.iterations
                    );
                } else {
                    debug!("Category `{name}` converged after {} iterations", stats.iterations);
                }
                BinaryClassifier::Linear(svc)
            };
            categories.push(CategoryClassifier {
                category: name.clone(),
                classifier,
            });
        }
        Ok(Self { categories })
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.category.clone()).collect()
    }

    /// Predict every category for every row.
    pub fn predict(&self, x: &[SparseRow]) -> LabelMatrix {
        let cols = self.categories.len();
        let mut values = Vec::with_capacity(x.len() * cols);
        for row in x {
            values.extend(self.categories.iter().map(|c| c.classifier.predict(row)));
        }
        LabelMatrix::from_predictions(x.len(), cols, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fits_each_category_independently() {
        let x: Vec<SparseRow> = vec![
            vec![(0, 1.0)],
            vec![(1, 1.0)],
            vec![(0, 0.7), (1, 0.7)],
            vec![(2, 1.0)],
        ];
        let y = LabelMatrix::from_columns(4, &[vec![1, 0, 1, 0], vec![0, 1, 1, 0]]).unwrap();
        let model =
            MultiOutputClassifier::fit(&x, &y, &names(&["water", "food"]), 3, 1.0, &SvmSettings::default())
                .unwrap();
        assert_eq!(model.category_names(), names(&["water", "food"]));
        assert_eq!(model.predict(&x), y);
    }

    #[test]
    fn constant_columns_get_constant_predictors() {
        let x: Vec<SparseRow> = vec![vec![(0, 1.0)], vec![(1, 1.0)]];
        let y = LabelMatrix::from_columns(2, &[vec![1, 0], vec![0, 0]]).unwrap();
        let model =
            MultiOutputClassifier::fit(&x, &y, &names(&["a", "child_alone"]), 2, 1.0, &SvmSettings::default())
                .unwrap();
        assert_eq!(
            model.categories[1].classifier,
            BinaryClassifier::Constant { label: 0 }
        );
        assert_eq!(model.predict(&[vec![(0, 1.0)]]).column(1), vec![0]);
    }

    #[test]
    fn shape_mismatches_are_validation_errors() {
        let x: Vec<SparseRow> = vec![vec![(0, 1.0)], vec![(0, 0.5)]];
        let y = LabelMatrix::from_columns(2, &[vec![1, 0]]).unwrap();
        let err = MultiOutputClassifier::fit(&x, &y, &names(&["a", "b"]), 1, 1.0, &SvmSettings::default())
            .unwrap_err();
        assert!(matches!(err, TriageError::Validation(_)));
        let err = MultiOutputClassifier::fit(&x[..1], &y, &names(&["a"]), 1, 1.0, &SvmSettings::default())
            .unwrap_err();
        assert!(matches!(err, TriageError::Validation(_)));
    }

    #[test]
    fn solver_failure_names_the_category() {
        let x: Vec<SparseRow> = vec![vec![(0, 1.0)], vec![(0, 0.5)]];
        let y = LabelMatrix::from_columns(2, &[vec![1, 0]]).unwrap();
        let err = MultiOutputClassifier::fit(&x, &y, &names(&["medical_help"]), 1, -1.0, &SvmSettings::default())
            .unwrap_err();
        assert!(matches!(err, TriageError::Training(msg) if msg.contains("medical_help")));
    }
}
