//! Training settings read from TOML.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::app_dirs::{self, AppDirError};
use crate::dataset::DEFAULT_TABLE;
use crate::ml::{ParamGrid, SvmSettings};

/// Settings for one training run. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Source table holding the labeled messages.
    #[serde(default = "default_table")]
    pub table: String,
    /// Share of rows held out for evaluation.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Pins the train/test shuffle. Unset means a fresh split each run.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,
    #[serde(default)]
    pub grid: ParamGrid,
    #[serde(default)]
    pub svm: SvmSettings,
    /// Replacement for the built-in noun exception table.
    #[serde(default)]
    pub lemma_exceptions: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            test_fraction: default_test_fraction(),
            seed: None,
            cv_folds: default_cv_folds(),
            grid: ParamGrid::default(),
            svm: SvmSettings::default(),
            lemma_exceptions: None,
        }
    }
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_cv_folds() -> usize {
    3
}

/// Errors raised while loading training settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    AppDir(#[from] AppDirError),
}

impl TrainConfig {
    /// Parse settings from a TOML file and validate them.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else `train.toml` in the app root if present, else defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            info!("Loading settings from {}", path.display());
            return Self::load_from(path);
        }
        let path = app_dirs::default_train_config_path()?;
        if path.is_file() {
            info!("Loading settings from {}", path.display());
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values the trainer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.trim().is_empty() {
            return Err(invalid("table", "must not be empty"));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(invalid(
                "test_fraction",
                format!("must be between 0 and 1, got {}", self.test_fraction),
            ));
        }
        if self.cv_folds < 2 {
            return Err(invalid(
                "cv_folds",
                format!("must be at least 2, got {}", self.cv_folds),
            ));
        }
        if self.grid.smooth_idf.is_empty() {
            return Err(invalid("grid.smooth_idf", "must list at least one value"));
        }
        if self.grid.c.is_empty() {
            return Err(invalid("grid.c", "must list at least one value"));
        }
        if let Some(c) = self.grid.c.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
            return Err(invalid("grid.c", format!("values must be positive, got {c}")));
        }
        if !(self.svm.tol.is_finite() && self.svm.tol >= 0.0) {
            return Err(invalid("svm.tol", format!("must be non-negative, got {}", self.svm.tol)));
        }
        if self.svm.max_iter == 0 {
            return Err(invalid("svm.max_iter", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
