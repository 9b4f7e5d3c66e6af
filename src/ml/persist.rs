//! JSON persistence of trained models.

use std::fs;
use std::path::Path;

use tracing::info;

use super::model::TrainedModel;
use crate::error::{Result, TriageError};

/// Write `model` as pretty JSON, creating parent directories as needed.
///
/// The file is written in place; an interrupted write can leave it truncated.
pub fn save_model(model: &TrainedModel, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| TriageError::io(parent, err))?;
    }
    let bytes = serde_json::to_vec_pretty(model)
        .map_err(|err| TriageError::io(path, std::io::Error::other(err)))?;
    fs::write(path, &bytes).map_err(|err| TriageError::io(path, err))?;
    info!("Wrote model ({} bytes) to {}", bytes.len(), path.display());
    Ok(())
}

/// Read a model written by [`save_model`] and check its structure.
pub fn load_model(path: &Path) -> Result<TrainedModel> {
    let bytes = fs::read(path).map_err(|err| TriageError::io(path, err))?;
    let model: TrainedModel = serde_json::from_slice(&bytes).map_err(|err| {
        TriageError::validation(format!("{} is not a model file: {err}", path.display()))
    })?;
    model.validate().map_err(|reason| {
        TriageError::validation(format!("{} holds an invalid model: {reason}", path.display()))
    })?;
    Ok(model)
}
