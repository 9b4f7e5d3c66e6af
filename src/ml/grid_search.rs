//! Exhaustive hyperparameter search with k-fold cross-validation.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::metrics::subset_accuracy;
use super::model::TrainedModel;
use super::pipeline::{PipelineParams, TextPipeline};
use super::svm::SvmSettings;
use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};
use crate::text::Tokenizer;

/// Values tried for each hyperparameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    #[serde(default = "default_smooth_idf")]
    pub smooth_idf: Vec<bool>,
    #[serde(default = "default_c")]
    pub c: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            smooth_idf: default_smooth_idf(),
            c: default_c(),
        }
    }
}

fn default_smooth_idf() -> Vec<bool> {
    vec![true, false]
}

fn default_c() -> Vec<f64> {
    vec![1.0, 5.0]
}

impl ParamGrid {
    /// Every combination, `C` varying slowest.
    pub fn candidates(&self) -> Vec<PipelineParams> {
        self.c
            .iter()
            .flat_map(|&c| {
                self.smooth_idf
                    .iter()
                    .map(move |&smooth_idf| PipelineParams { smooth_idf, c })
            })
            .collect()
    }
}

/// Cross-validation outcome of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: PipelineParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

/// Train/validation row indices of one fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Contiguous, unshuffled folds. The first `n % folds` folds hold one extra row.
pub fn k_fold(n: usize, folds: usize) -> Result<Vec<Fold>> {
    if folds < 2 {
        return Err(TriageError::validation(format!(
            "cross-validation needs at least 2 folds, got {folds}"
        )));
    }
    if n < folds {
        return Err(TriageError::validation(format!(
            "cannot split {n} training rows into {folds} folds"
        )));
    }
    let base = n / folds;
    let extra = n % folds;
    let mut start = 0;
    let mut out = Vec::with_capacity(folds);
    for fold in 0..folds {
        let len = base + usize::from(fold < extra);
        let end = start + len;
        out.push(Fold {
            train: (0..start).chain(end..n).collect(),
            test: (start..end).collect(),
        });
        start = end;
    }
    Ok(out)
}

/// Untrained search controller over [`TextPipeline`] configurations.
#[derive(Debug, Clone)]
pub struct GridSearch {
    tokenizer: Tokenizer,
    grid: ParamGrid,
    folds: usize,
    svm: SvmSettings,
}

impl GridSearch {
    pub fn new(tokenizer: Tokenizer, grid: ParamGrid, folds: usize, svm: SvmSettings) -> Self {
        Self {
            tokenizer,
            grid,
            folds,
            svm,
        }
    }

    pub fn candidates(&self) -> Vec<PipelineParams> {
        self.grid.candidates()
    }

    /// Score every candidate by mean subset accuracy, then refit the best on all rows.
    ///
    /// Ties keep the earliest candidate.
    pub fn fit(
        &self,
        messages: &[String],
        targets: &LabelMatrix,
        category_names: &[String],
    ) -> Result<TrainedModel> {
        if messages.len() != targets.rows() {
            return Err(TriageError::validation(format!(
                "{} messages but {} target rows",
                messages.len(),
                targets.rows()
            )));
        }
        let candidates = self.candidates();
        if candidates.is_empty() {
            return Err(TriageError::validation("parameter grid has no candidates"));
        }
        let folds = k_fold(messages.len(), self.folds)?;
        info!(
            "Searching {} candidates with {}-fold cross-validation over {} rows",
            candidates.len(),
            folds.len(),
            messages.len()
        );

        let mut cv_results = Vec::with_capacity(candidates.len());
        let mut best: Option<(usize, f64)> = None;
        for (idx, params) in candidates.iter().enumerate() {
            let mut fold_scores = Vec::with_capacity(folds.len());
            for fold in &folds {
                fold_scores.push(self.score_fold(messages, targets, category_names, params, fold)?);
            }
            let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
            info!(
                "Candidate {}/{} ({params}): mean subset accuracy {mean_score:.4}",
                idx + 1,
                candidates.len()
            );
            if best.is_none_or(|(_, score)| mean_score > score) {
                best = Some((idx, mean_score));
            }
            cv_results.push(CandidateScore {
                params: *params,
                fold_scores,
                mean_score,
            });
        }

        let (best, best_score) = best.unwrap_or((0, 0.0));
        let chosen = cv_results[best].params;
        info!(
            "Best candidate: {chosen} (mean subset accuracy {best_score:.4}); refitting on {} rows",
            messages.len()
        );
        let pipeline =
            TextPipeline::fit(&self.tokenizer, messages, targets, category_names, &chosen, &self.svm)?;
        Ok(TrainedModel::new(chosen, cv_results, category_names.to_vec(), pipeline))
    }

    fn score_fold(
        &self,
        messages: &[String],
        targets: &LabelMatrix,
        category_names: &[String],
        params: &PipelineParams,
        fold: &Fold,
    ) -> Result<f64> {
        let train_messages: Vec<String> = fold.train.iter().map(|&i| messages[i].clone()).collect();
        let test_messages: Vec<String> = fold.test.iter().map(|&i| messages[i].clone()).collect();
        let train_targets = targets.select_rows(&fold.train);
        let test_targets = targets.select_rows(&fold.test);
        let pipeline = TextPipeline::fit(
            &self.tokenizer,
            &train_messages,
            &train_targets,
            category_names,
            params,
            &self.svm,
        )?;
        Ok(subset_accuracy(&test_targets, &pipeline.predict(&test_messages)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Lemmatizer;

    #[test]
    fn default_grid_orders_c_outer_smoothing_inner() {
        let candidates = ParamGrid::default().candidates();
        let pairs: Vec<(f64, bool)> = candidates.iter().map(|p| (p.c, p.smooth_idf)).collect();
        assert_eq!(pairs, vec![(1.0, true), (1.0, false), (5.0, true), (5.0, false)]);
    }

    #[test]
    fn k_fold_is_contiguous_and_covers_every_row() {
        let folds = k_fold(10, 3).unwrap();
        assert_eq!(folds[0].test, vec![0, 1, 2, 3]);
        assert_eq!(folds[1].test, vec![4, 5, 6]);
        assert_eq!(folds[2].test, vec![7, 8, 9]);
        assert_eq!(folds[1].train, vec![0, 1, 2, 3, 7, 8, 9]);
        assert!(k_fold(2, 3).is_err());
        assert!(k_fold(10, 1).is_err());
    }

    #[test]
    fn search_records_every_candidate_and_refits_the_winner() {
        let tokenizer = Tokenizer::new(Lemmatizer::embedded().unwrap());
        let mut messages = Vec::new();
        let mut water = Vec::new();
        let mut food = Vec::new();
        for i in 0..12 {
            let (text, w, f) = match i % 3 {
                0 => ("water supply needed", 1, 0),
                1 => ("food rations needed", 0, 1),
                _ => ("road blocked near bridge", 0, 0),
            };
            messages.push(format!("{text} {i}"));
            water.push(w);
            food.push(f);
        }
        let targets = LabelMatrix::from_columns(12, &[water, food]).unwrap();
        let names = vec!["water".to_string(), "food".to_string()];
        let search = GridSearch::new(tokenizer, ParamGrid::default(), 3, SvmSettings::default());
        let model = search.fit(&messages, &targets, &names).unwrap();
        assert_eq!(model.cv_results.len(), 4);
        assert!(model.cv_results.iter().all(|r| r.fold_scores.len() == 3));
        let best = model
            .cv_results
            .iter()
            .map(|r| r.mean_score)
            .fold(f64::NEG_INFINITY, f64::max);
        let first_best = model
            .cv_results
            .iter()
            .find(|r| r.mean_score == best)
            .unwrap();
        assert_eq!(model.chosen, first_best.params);
        assert_eq!(model.predict(&messages), targets);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let tokenizer = Tokenizer::new(Lemmatizer::embedded().unwrap());
        let grid = ParamGrid {
            smooth_idf: vec![],
            c: vec![1.0],
        };
        let search = GridSearch::new(tokenizer, grid, 2, SvmSettings::default());
        let targets = LabelMatrix::from_columns(2, &[vec![1, 0]]).unwrap();
        let err = search
            .fit(&["a b".to_string(), "c d".to_string()], &targets, &["x".to_string()])
            .unwrap_err();
        assert!(matches!(err, TriageError::Validation(_)));
    }
}
