//! Classification metrics over binary label matrices.

use crate::dataset::LabelMatrix;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Confusion matrix for a `K`-class problem.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u64>,
}

impl ConfusionMatrix {
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Tally paired truth/prediction values. Values outside `0..K` are ignored.
    pub fn from_pairs(n_classes: usize, truth: &[u8], predicted: &[u8]) -> Self {
        let mut cm = Self::new(n_classes);
        for (&t, &p) in truth.iter().zip(predicted) {
            cm.add(t as usize, p as usize);
        }
        cm
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u64 {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`, zero when nothing was predicted as the class.
    pub precision: f64,
    /// `TP / (TP + FN)`, zero when the class never occurs.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Total number of true examples for the class.
    pub support: u64,
}

/// Harmonic mean, zero when both inputs are zero.
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Compute per-class precision, recall and F1 from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f64;
        let mut fp = 0f64;
        let mut fn_ = 0f64;
        let mut support = 0u64;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f64;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f64;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(PerClassStats {
            precision,
            recall,
            f1: f1_score(precision, recall),
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f64 {
    let total = cm.total();
    if total == 0 {
        return 0.0;
    }
    let correct: u64 = (0..cm.n_classes).map(|k| cm.get(k, k)).sum();
    correct as f64 / total as f64
}

/// Fraction of rows whose predicted value in column `col` equals the true value.
///
/// Both matrices must have the same shape; callers check this up front.
pub fn column_accuracy(truth: &LabelMatrix, predicted: &LabelMatrix, col: usize) -> f64 {
    if truth.rows() == 0 {
        return 0.0;
    }
    let correct = (0..truth.rows())
        .filter(|&r| truth.get(r, col) == predicted.get(r, col))
        .count();
    correct as f64 / truth.rows() as f64
}

/// Fraction of rows whose full label vector is predicted exactly.
pub fn subset_accuracy(truth: &LabelMatrix, predicted: &LabelMatrix) -> f64 {
    if truth.rows() == 0 {
        return 0.0;
    }
    let correct = (0..truth.rows())
        .filter(|&r| truth.row(r) == predicted.row(r))
        .count();
    correct as f64 / truth.rows() as f64
}
