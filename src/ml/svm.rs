//! Binary linear support vector classifier.
//!
//! Minimizes `0.5 * |w|^2 + C * sum(max(0, 1 - y_i * (w.x_i + b))^2)` with dual coordinate
//! descent. The bias is learned as the weight of an implicit constant feature equal to 1.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::vectorize::{SparseRow, sparse_dot, squared_norm};

/// Solver settings shared by every candidate of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmSettings {
    /// Stop once the projected-gradient spread drops below this value.
    #[serde(default = "default_tol")]
    pub tol: f64,
    /// Maximum number of passes over the training rows.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
}

impl Default for SvmSettings {
    fn default() -> Self {
        Self {
            tol: default_tol(),
            max_iter: default_max_iter(),
        }
    }
}

fn default_tol() -> f64 {
    1e-4
}

fn default_max_iter() -> usize {
    1000
}

/// Options for one fit.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Inverse regularization strength.
    pub c: f64,
    pub tol: f64,
    pub max_iter: usize,
    /// Seed for the coordinate visiting order.
    pub seed: u64,
}

impl TrainOptions {
    pub fn new(c: f64, settings: &SvmSettings) -> Self {
        Self {
            c,
            tol: settings.tol,
            max_iter: settings.max_iter,
            seed: 0,
        }
    }
}

/// Fitted separating hyperplane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvc {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// Solver bookkeeping returned next to the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStats {
    pub iterations: usize,
    pub converged: bool,
}

impl LinearSvc {
    pub fn decision_function(&self, row: &[(u32, f64)]) -> f64 {
        sparse_dot(&self.weights, row) + self.bias
    }

    pub fn predict(&self, row: &[(u32, f64)]) -> u8 {
        u8::from(self.decision_function(row) > 0.0)
    }
}

/// Fit on `{0, 1}` labels. Both classes must be present.
pub fn train_linear_svc(
    x: &[SparseRow],
    y: &[u8],
    n_features: usize,
    options: &TrainOptions,
) -> Result<(LinearSvc, FitStats), String> {
    if x.is_empty() {
        return Err("Empty training set".to_string());
    }
    if x.len() != y.len() {
        return Err("Mismatched training inputs/labels".to_string());
    }
    if !(options.c > 0.0) || !options.c.is_finite() {
        return Err(format!("C must be positive, got {}", options.c));
    }
    if !y.contains(&0) || !y.contains(&1) {
        return Err("Training labels must contain both classes".to_string());
    }
    if let Some(&(idx, _)) = x
        .iter()
        .flat_map(|row| row.iter())
        .find(|&&(idx, _)| idx as usize >= n_features)
    {
        return Err(format!("Feature index {idx} out of range for {n_features} features"));
    }

    let n = x.len();
    let diag = 0.5 / options.c;
    let signs: Vec<f64> = y.iter().map(|&label| if label == 1 { 1.0 } else { -1.0 }).collect();
    let qd: Vec<f64> = x.iter().map(|row| squared_norm(row) + 1.0 + diag).collect();
    let mut alpha = vec![0.0f64; n];
    let mut weights = vec![0.0f64; n_features];
    let mut bias = 0.0f64;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut order: Vec<usize> = (0..n).collect();
    let mut iterations = 0usize;
    let mut converged = false;

    while iterations < options.max_iter {
        order.shuffle(&mut rng);
        let mut pg_max = f64::NEG_INFINITY;
        let mut pg_min = f64::INFINITY;
        for &i in &order {
            let yi = signs[i];
            let margin = sparse_dot(&weights, &x[i]) + bias;
            let grad = yi * margin - 1.0 + diag * alpha[i];
            let projected = if alpha[i] == 0.0 { grad.min(0.0) } else { grad };
            pg_max = pg_max.max(projected);
            pg_min = pg_min.min(projected);
            if projected.abs() > 1e-12 {
                let previous = alpha[i];
                alpha[i] = (previous - grad / qd[i]).max(0.0);
                let step = (alpha[i] - previous) * yi;
                for &(idx, value) in &x[i] {
                    weights[idx as usize] += step * value;
                }
                bias += step;
            }
        }
        iterations += 1;
        if pg_max - pg_min <= options.tol {
            converged = true;
            break;
        }
    }

    Ok((
        LinearSvc { weights, bias },
        FitStats {
            iterations,
            converged,
        },
    ))
}
