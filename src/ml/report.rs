//! Held-out evaluation: flattened and per-category classification reports.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::metrics::{
    ConfusionMatrix, PerClassStats, accuracy, column_accuracy, precision_recall_by_class,
};
use super::model::TrainedModel;
use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};

/// One line of a classification report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: u64,
}

impl ReportRow {
    fn from_stats(label: impl Into<String>, stats: &PerClassStats) -> Self {
        Self {
            label: label.into(),
            precision: stats.precision,
            recall: stats.recall,
            f1: stats.f1,
            support: stats.support,
        }
    }
}

/// Rows plus their unweighted and support-weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub rows: Vec<ReportRow>,
    pub macro_avg: ReportRow,
    pub weighted_avg: ReportRow,
}

impl ReportTable {
    fn new(rows: Vec<ReportRow>) -> Self {
        let n = rows.len().max(1) as f64;
        let total: u64 = rows.iter().map(|r| r.support).sum();
        let mean = |f: fn(&ReportRow) -> f64| rows.iter().map(f).sum::<f64>() / n;
        let weighted = |f: fn(&ReportRow) -> f64| {
            if total == 0 {
                0.0
            } else {
                rows.iter().map(|r| f(r) * r.support as f64).sum::<f64>() / total as f64
            }
        };
        let macro_avg = ReportRow {
            label: "macro avg".to_string(),
            precision: mean(|r| r.precision),
            recall: mean(|r| r.recall),
            f1: mean(|r| r.f1),
            support: total,
        };
        let weighted_avg = ReportRow {
            label: "weighted avg".to_string(),
            precision: weighted(|r| r.precision),
            recall: weighted(|r| r.recall),
            f1: weighted(|r| r.f1),
            support: total,
        };
        Self {
            rows,
            macro_avg,
            weighted_avg,
        }
    }
}

/// Metrics of a model on held-out rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Every cell of the label matrices treated as one binary problem, rows for `0` and `1`.
    pub flattened: ReportTable,
    /// Accuracy of the flattened problem.
    pub flattened_accuracy: f64,
    /// Positive-label scores of each category.
    pub categories: ReportTable,
    /// Fraction of rows where each category column is predicted correctly.
    pub category_accuracy: Vec<(String, f64)>,
}

/// Compare predictions against truth. All three inputs must agree in shape.
pub fn build_report(
    truth: &LabelMatrix,
    predicted: &LabelMatrix,
    category_names: &[String],
) -> Result<EvaluationReport> {
    if truth.rows() != predicted.rows() || truth.cols() != predicted.cols() {
        return Err(TriageError::validation(format!(
            "predictions are {}x{} but truth is {}x{}",
            predicted.rows(),
            predicted.cols(),
            truth.rows(),
            truth.cols()
        )));
    }
    if category_names.len() != truth.cols() {
        return Err(TriageError::validation(format!(
            "{} category names for {} predicted columns",
            category_names.len(),
            truth.cols()
        )));
    }

    let flat = ConfusionMatrix::from_pairs(2, truth.flattened(), predicted.flattened());
    let flat_stats = precision_recall_by_class(&flat);
    let flattened = ReportTable::new(
        flat_stats
            .iter()
            .enumerate()
            .map(|(label, stats)| ReportRow::from_stats(label.to_string(), stats))
            .collect(),
    );

    let mut rows = Vec::with_capacity(category_names.len());
    let mut category_accuracy = Vec::with_capacity(category_names.len());
    for (col, name) in category_names.iter().enumerate() {
        let cm = ConfusionMatrix::from_pairs(2, &truth.column(col), &predicted.column(col));
        let positive = &precision_recall_by_class(&cm)[1];
        rows.push(ReportRow::from_stats(name.clone(), positive));
        category_accuracy.push((name.clone(), column_accuracy(truth, predicted, col)));
    }

    Ok(EvaluationReport {
        flattened,
        flattened_accuracy: accuracy(&flat),
        categories: ReportTable::new(rows),
        category_accuracy,
    })
}

/// Predict `messages` with `model` and report against `truth`.
pub fn evaluate(
    model: &TrainedModel,
    messages: &[String],
    truth: &LabelMatrix,
    category_names: &[String],
) -> Result<EvaluationReport> {
    if messages.len() != truth.rows() {
        return Err(TriageError::validation(format!(
            "{} messages but {} target rows",
            messages.len(),
            truth.rows()
        )));
    }
    if model.category_names != category_names {
        return Err(TriageError::validation(format!(
            "model predicts {} categories but {} were given",
            model.category_names.len(),
            category_names.len()
        )));
    }
    build_report(truth, &model.predict(messages), category_names)
}

fn write_row(f: &mut fmt::Formatter<'_>, width: usize, row: &ReportRow) -> fmt::Result {
    writeln!(
        f,
        "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        row.label, row.precision, row.recall, row.f1, row.support
    )
}

fn write_table(
    f: &mut fmt::Formatter<'_>,
    width: usize,
    table: &ReportTable,
    accuracy: Option<f64>,
) -> fmt::Result {
    writeln!(
        f,
        "{:>width$} {:>9} {:>9} {:>9} {:>9}",
        "", "precision", "recall", "f1-score", "support"
    )?;
    writeln!(f)?;
    for row in &table.rows {
        write_row(f, width, row)?;
    }
    writeln!(f)?;
    if let Some(accuracy) = accuracy {
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", accuracy, table.macro_avg.support
        )?;
    }
    write_row(f, width, &table.macro_avg)?;
    write_row(f, width, &table.weighted_avg)
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .categories
            .rows
            .iter()
            .map(|r| r.label.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);
        write_table(f, width, &self.flattened, Some(self.flattened_accuracy))?;
        writeln!(f)?;
        write_table(f, width, &self.categories, None)?;
        writeln!(f, "---------------------------------")?;
        for (name, accuracy) in &self.category_accuracy {
            writeln!(f, "{name:>25} accuracy : {accuracy:.2}")?;
        }
        Ok(())
    }
}
