//! End-to-end training run: load, split, search, evaluate, persist.

use std::path::PathBuf;

use tracing::info;

use crate::config::TrainConfig;
use crate::dataset::{Dataset, load_dataset, train_test_split};
use crate::error::Result;
use crate::ml::{EvaluationReport, GridSearch, PipelineParams, TrainedModel, evaluate, save_model};
use crate::text::Tokenizer;

/// Inputs of one training run.
#[derive(Debug, Clone)]
pub struct TrainRequest {
    pub database: PathBuf,
    pub model_out: PathBuf,
    pub config: TrainConfig,
    pub tokenizer: Tokenizer,
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub chosen: PipelineParams,
    pub train_rows: usize,
    pub test_rows: usize,
    pub vocabulary_size: usize,
    pub report: EvaluationReport,
    pub model_path: PathBuf,
}

/// Build the untrained search controller for `config`.
pub fn build_model(tokenizer: Tokenizer, config: &TrainConfig) -> GridSearch {
    GridSearch::new(
        tokenizer,
        config.grid.clone(),
        config.cv_folds,
        config.svm.clone(),
    )
}

/// Hold out a test split of `dataset` and fit a search controller on the rest.
///
/// Returns the fitted model and the held-out rows.
pub fn fit_on_split(
    dataset: &Dataset,
    tokenizer: Tokenizer,
    config: &TrainConfig,
) -> Result<(TrainedModel, Dataset)> {
    let split = train_test_split(dataset.len(), config.test_fraction, config.seed)?;
    let (train, test) = dataset.partition(&split);
    info!(
        "Split {} rows into {} training and {} test rows",
        dataset.len(),
        train.len(),
        test.len()
    );
    info!("Building model...");
    let search = build_model(tokenizer, config);
    info!("Training model...");
    let model = search.fit(&train.messages, &train.targets, &train.category_names)?;
    Ok((model, test))
}

/// Run every stage in order. The first failure aborts the run and nothing is written.
///
/// `on_report` sees the evaluation before the model is saved.
pub fn run(
    request: TrainRequest,
    mut on_report: impl FnMut(&EvaluationReport),
) -> Result<TrainSummary> {
    let TrainRequest {
        database,
        model_out,
        config,
        tokenizer,
    } = request;

    info!("Loading data...\n    DATABASE: {}", database.display());
    let dataset = load_dataset(&database, &config.table)?;
    let (model, test) = fit_on_split(&dataset, tokenizer, &config)?;

    info!("Evaluating model...");
    let report = evaluate(&model, &test.messages, &test.targets, &test.category_names)?;
    on_report(&report);

    info!("Saving model...\n    MODEL: {}", model_out.display());
    save_model(&model, &model_out)?;
    info!("Trained model saved!");

    Ok(TrainSummary {
        chosen: model.chosen,
        train_rows: dataset.len() - test.len(),
        test_rows: test.len(),
        vocabulary_size: model.pipeline.vocabulary_size(),
        report,
        model_path: model_out,
    })
}
