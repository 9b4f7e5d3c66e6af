//! Classify messages with a model written by `triage`.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use triage::error::TriageError;
use triage::ml::{TrainedModel, load_model};

/// Print the categories a trained model assigns to each message.
#[derive(Parser, Debug, Clone)]
#[command(name = "triage-predict")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct PredictArgs {
    /// Model file written by `triage`
    #[arg(value_name = "MODEL_PATH")]
    model: PathBuf,

    /// Messages to classify; read one per line from stdin when omitted
    #[arg(value_name = "MESSAGE")]
    messages: Vec<String>,
}

fn main() {
    let args = PredictArgs::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: PredictArgs) -> Result<(), TriageError> {
    let model = load_model(&args.model)?;
    if !args.messages.is_empty() {
        for message in &args.messages {
            print_prediction(&model, message);
        }
        return Ok(());
    }
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| TriageError::io("<stdin>", err))?;
        if line.trim().is_empty() {
            continue;
        }
        print_prediction(&model, &line);
    }
    Ok(())
}

fn print_prediction(model: &TrainedModel, message: &str) {
    let categories = model.predict_categories(message);
    if categories.is_empty() {
        println!("{message}\t-");
    } else {
        println!("{message}\t{}", categories.join(","));
    }
}
