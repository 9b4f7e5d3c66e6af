//! Locations of the `.triage` folder holding default settings and run logs.
//!
//! The folder lives under the OS config directory and can be relocated with
//! `TRIAGE_CONFIG_HOME`, which tests use to stay out of the real home directory.

use std::path::PathBuf;

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory under the config root.
pub const APP_DIR_NAME: &str = ".triage";
/// Environment variable that replaces the OS config root.
pub const CONFIG_HOME_ENV: &str = "TRIAGE_CONFIG_HOME";
/// Settings file picked up when no `--config` is given.
pub const TRAIN_CONFIG_FILE_NAME: &str = "train.toml";

/// Errors that can occur while resolving or preparing application directories.
#[derive(Debug, Error)]
pub enum AppDirError {
    /// No suitable base config directory could be resolved.
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    /// Failed to create a directory.
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Path of the `.triage` root without touching the filesystem.
pub fn app_root_path() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    Ok(base.join(APP_DIR_NAME))
}

/// Default location of `train.toml`; the file may not exist.
pub fn default_train_config_path() -> Result<PathBuf, AppDirError> {
    Ok(app_root_path()?.join(TRAIN_CONFIG_FILE_NAME))
}

/// Return the logs directory inside the `.triage` root, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    let path = app_root_path()?.join("logs");
    std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn config_base_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_HOME_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
}
