//! Trains the disaster-response message classifier.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;

use triage::config::TrainConfig;
use triage::error::TriageError;
use triage::logging;
use triage::text::{Tokenizer, lemma};
use triage::train::{self, TrainRequest, TrainSummary};

/// Train a multi-label classifier on labeled disaster messages and save it as JSON.
#[derive(Parser, Debug, Clone)]
#[command(name = "triage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    after_help = "Example: triage ../data/DisasterResponse.db classifier.json"
)]
struct TriageArgs {
    /// SQLite database holding the labeled messages
    #[arg(value_name = "DATABASE_PATH")]
    database: PathBuf,

    /// Destination of the trained model
    #[arg(value_name = "MODEL_PATH")]
    model: PathBuf,

    /// Settings file (defaults to train.toml in the app directory, if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Table to read messages from
    #[arg(long, value_name = "NAME")]
    table: Option<String>,

    /// Seed for the train/test split
    #[arg(long)]
    seed: Option<u64>,

    /// Share of rows held out for evaluation
    #[arg(long, value_name = "F")]
    test_fraction: Option<f64>,

    /// Number of cross-validation folds
    #[arg(long, value_name = "K")]
    cv_folds: Option<usize>,
}

impl TriageArgs {
    /// Settings file or defaults, then flags on top, then validation of the merged result.
    fn resolve_config(&self) -> Result<TrainConfig, TriageError> {
        let mut config = TrainConfig::load_or_default(self.config.as_deref())?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut TrainConfig) {
        if let Some(table) = &self.table {
            config.table = table.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if let Some(folds) = self.cv_folds {
            config.cv_folds = folds;
        }
    }
}

fn main() {
    let args = TriageArgs::parse();

    if let Err(err) = logging::init() {
        eprintln!("File logging disabled: {err}");
        logging::init_console();
    }

    match run(args) {
        Ok(summary) => {
            println!(
                "Chose {} over {} training rows ({} terms); model written to {}",
                summary.chosen,
                summary.train_rows,
                summary.vocabulary_size,
                summary.model_path.display()
            );
        }
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}

fn run(args: TriageArgs) -> Result<TrainSummary, TriageError> {
    let config = args.resolve_config()?;

    let lemmatizer = lemma::init(config.lemma_exceptions.as_deref())?;
    let request = TrainRequest {
        database: args.database,
        model_out: args.model,
        config,
        tokenizer: Tokenizer::new(lemmatizer.clone()),
    };
    train::run(request, |report| println!("{report}"))
}
