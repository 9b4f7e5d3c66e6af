//! Bag-of-words counting and TF-IDF weighting over sparse rows.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::text::Tokenizer;

/// Sparse feature row: `(column, value)` pairs sorted by column.
pub type SparseRow = Vec<(u32, f64)>;

/// Dot product of a dense weight vector with a sparse row.
pub fn sparse_dot(weights: &[f64], row: &[(u32, f64)]) -> f64 {
    row.iter()
        .map(|&(idx, value)| weights[idx as usize] * value)
        .sum()
}

pub fn squared_norm(row: &[(u32, f64)]) -> f64 {
    row.iter().map(|&(_, value)| value * value).sum()
}

/// Token counter with a vocabulary learned from training messages.
///
/// Terms are numbered in lexicographic order, so the same training corpus always yields
/// the same column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountVectorizer {
    tokenizer: Tokenizer,
    vocabulary: BTreeMap<String, u32>,
}

impl CountVectorizer {
    /// Learn the vocabulary of `messages`.
    pub fn fit(tokenizer: &Tokenizer, messages: &[String]) -> Result<Self> {
        let mut terms = BTreeSet::new();
        for message in messages {
            terms.extend(tokenizer.tokenize(message).iter());
        }
        if terms.is_empty() {
            return Err(TriageError::training(
                "empty vocabulary; training messages contain no alphanumeric tokens",
            ));
        }
        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx as u32))
            .collect();
        Ok(Self {
            tokenizer: tokenizer.clone(),
            vocabulary,
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Column index of `term`, if it was seen during fitting.
    pub fn term_index(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    /// Check that term indices are exactly the columns `0..vocabulary_size()`.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let size = self.vocabulary.len();
        let mut seen = vec![false; size];
        for (term, &idx) in &self.vocabulary {
            match seen.get_mut(idx as usize) {
                None => {
                    return Err(format!(
                        "term `{term}` has column {idx} outside a vocabulary of {size}"
                    ));
                }
                Some(true) => return Err(format!("term `{term}` reuses column {idx}")),
                Some(slot) => *slot = true,
            }
        }
        Ok(())
    }

    /// Count known tokens of each message. Unknown tokens are dropped.
    pub fn transform(&self, messages: &[String]) -> Vec<SparseRow> {
        messages
            .iter()
            .map(|message| {
                let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
                for token in &self.tokenizer.tokenize(message) {
                    if let Some(idx) = self.term_index(&token) {
                        *counts.entry(idx).or_insert(0.0) += 1.0;
                    }
                }
                counts.into_iter().collect()
            })
            .collect()
    }
}

/// Inverse-document-frequency weights followed by L2 row normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfTransformer {
    smooth_idf: bool,
    idf: Vec<f64>,
}

impl TfidfTransformer {
    /// Compute idf from count rows over `n_features` columns.
    ///
    /// With smoothing, `idf = ln((1 + n) / (1 + df)) + 1`, as if one extra document held
    /// every term once. Without it, `idf = ln(n / df) + 1`.
    pub fn fit(counts: &[SparseRow], n_features: usize, smooth_idf: bool) -> Self {
        let mut df = vec![0usize; n_features];
        for row in counts {
            for &(idx, value) in row {
                if value != 0.0 {
                    df[idx as usize] += 1;
                }
            }
        }
        let n = counts.len() as f64;
        let idf = df
            .into_iter()
            .map(|df| {
                let df = df as f64;
                if smooth_idf {
                    ((1.0 + n) / (1.0 + df)).ln() + 1.0
                } else {
                    (n / df.max(1.0)).ln() + 1.0
                }
            })
            .collect();
        Self { smooth_idf, idf }
    }

    pub fn smooth_idf(&self) -> bool {
        self.smooth_idf
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Weight counts by idf and scale each non-empty row to unit length.
    pub fn transform(&self, counts: Vec<SparseRow>) -> Vec<SparseRow> {
        counts
            .into_iter()
            .map(|mut row| {
                for (idx, value) in row.iter_mut() {
                    *value *= self.idf[*idx as usize];
                }
                let norm = squared_norm(&row).sqrt();
                if norm > 0.0 {
                    for (_, value) in row.iter_mut() {
                        *value /= norm;
                    }
                }
                row
            })
            .collect()
    }
}
