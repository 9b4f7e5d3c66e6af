mod support;

use std::path::Path;
use std::process::{Command, Output};

use support::corpus::write_corpus_db;
use tempfile::tempdir;
use triage::app_dirs::CONFIG_HOME_ENV;
use triage::ml::load_model;

/// Run `triage` with the app root pointed at `home`.
fn triage(home: &Path, args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_triage"))
        .env(CONFIG_HOME_ENV, home)
        .args(args)
        .arg("--seed")
        .arg("7")
        .output()
        .unwrap()
}

#[test]
fn missing_model_path_exits_with_usage_code() {
    let dir = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_triage"))
        .env(CONFIG_HOME_ENV, dir.path())
        .arg(dir.path().join("DisasterResponse.db"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unreadable_database_exits_with_failure_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("absent.db");
    let model_out = dir.path().join("classifier.json");

    let output = triage(dir.path(), &[&db, &model_out]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
    assert!(!model_out.exists());
    assert!(!db.exists());
}

#[test]
fn trains_and_serves_predictions_from_the_saved_model() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("DisasterResponse.db");
    write_corpus_db(&db, "FigureEight", 100);
    let model_out = dir.path().join("classifier.json");

    let output = triage(dir.path(), &[&db, &model_out]);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("water accuracy"), "{stdout}");
    assert!(load_model(&model_out).is_ok());

    let predicted = Command::new(env!("CARGO_BIN_EXE_triage-predict"))
        .arg(&model_out)
        .arg("we have no clean water")
        .output()
        .unwrap();
    assert!(predicted.status.success());
    assert_eq!(
        String::from_utf8_lossy(&predicted.stdout).trim_end(),
        "we have no clean water\twater"
    );
}

#[test]
fn predict_rejects_a_missing_model() {
    let dir = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_triage-predict"))
        .arg(dir.path().join("absent.json"))
        .arg("help")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}
