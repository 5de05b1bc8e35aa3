//! Epsilon-insensitive support-vector regression with an RBF kernel.
//!
//! Solved in the dual by cyclic coordinate descent. The bias term is absorbed
//! into the kernel (`K(a, b) + 1`), which removes the equality constraint and
//! leaves a box-constrained, L1-regularized quadratic:
//!
//! ```text
//! min  ½ βᵀQβ − yᵀβ + ε‖β‖₁   subject to  −C ≤ βᵢ ≤ C
//! ```
//!
//! Each coordinate step has a closed form (soft-threshold then clip), so the
//! solver is deterministic and needs no learning rate.

use super::{check_fit_input, not_fitted, Regressor};
use crate::error::PredictError;

#[derive(Debug, Clone)]
pub struct SvrConfig {
    /// Box constraint on the dual coefficients.
    pub c: f64,
    /// RBF kernel width.
    pub gamma: f64,
    /// Half-width of the insensitive tube.
    pub epsilon: f64,
    /// Maximum number of full sweeps over the coordinates.
    pub max_sweeps: usize,
    /// Stop once the largest coefficient change in a sweep is below this.
    pub tolerance: f64,
}

impl Default for SvrConfig {
    fn default() -> Self {
        Self {
            c: 1e3,
            gamma: 0.1,
            epsilon: 0.1,
            max_sweeps: 1000,
            tolerance: 1e-3,
        }
    }
}

#[derive(Debug, Clone)]
struct SvrModel {
    support: Vec<f64>,
    beta: Vec<f64>,
    offset: f64,
}

#[derive(Debug, Clone)]
pub struct SvrRegressor {
    config: SvrConfig,
    model: Option<SvrModel>,
}

impl SvrRegressor {
    pub fn new(config: SvrConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    fn kernel(&self, a: f64, b: f64) -> f64 {
        (-self.config.gamma * (a - b).powi(2)).exp() + 1.0
    }

    /// Number of samples with a non-zero dual coefficient.
    pub fn support_vector_count(&self) -> usize {
        self.model
            .as_ref()
            .map(|m| m.beta.iter().filter(|b| **b != 0.0).count())
            .unwrap_or(0)
    }
}

impl Regressor for SvrRegressor {
    fn name(&self) -> &str {
        "SVM"
    }

    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), PredictError> {
        check_fit_input(self.name(), x, y)?;
        let n = x.len();
        let SvrConfig {
            c,
            epsilon,
            max_sweeps,
            tolerance,
            ..
        } = self.config;

        // Centering the targets keeps the absorbed bias small.
        let offset = y.iter().sum::<f64>() / n as f64;
        let targets: Vec<f64> = y.iter().map(|v| v - offset).collect();

        let q: Vec<Vec<f64>> = x
            .iter()
            .map(|&a| x.iter().map(|&b| self.kernel(a, b)).collect())
            .collect();

        let mut beta = vec![0.0; n];
        // q_beta[i] = (Qβ)_i, kept current as coefficients move.
        let mut q_beta = vec![0.0; n];

        let mut sweeps = 0;
        for sweep in 0..max_sweeps {
            sweeps = sweep + 1;
            let mut max_delta: f64 = 0.0;
            for i in 0..n {
                let q_ii = q[i][i];
                let gradient = q_beta[i] - targets[i];
                let z = beta[i] - gradient / q_ii;
                let threshold = epsilon / q_ii;
                let shrunk = z.signum() * (z.abs() - threshold).max(0.0);
                let updated = shrunk.clamp(-c, c);
                let delta = updated - beta[i];
                if delta != 0.0 {
                    for (qb, q_ji) in q_beta.iter_mut().zip(q.iter().map(|row| row[i])) {
                        *qb += delta * q_ji;
                    }
                    beta[i] = updated;
                    max_delta = max_delta.max(delta.abs());
                }
            }
            if max_delta < tolerance {
                break;
            }
        }

        if beta.iter().any(|b| !b.is_finite()) {
            return Err(PredictError::ModelFitFailure(
                "SVM: solver diverged".into(),
            ));
        }
        tracing::debug!(samples = n, sweeps, "svr fit complete");

        self.model = Some(SvrModel {
            support: x.to_vec(),
            beta,
            offset,
        });
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, PredictError> {
        let model = self.model.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        Ok(x.iter()
            .map(|&v| {
                model
                    .support
                    .iter()
                    .zip(&model.beta)
                    .filter(|(_, b)| **b != 0.0)
                    .map(|(&s, b)| b * self.kernel(s, v))
                    .sum::<f64>()
                    + model.offset
            })
            .collect())
    }
}
