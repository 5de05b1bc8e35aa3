//! Model strategy registry: the closed set of regression strategies.
//!
//! Every strategy implements [`Regressor`]: fit on one training partition,
//! predict a batch of inputs, score with the coefficient of determination.
//! Adding a strategy means adding a [`ModelKind`] variant and its `build` arm.

pub mod forest;
pub mod lstm;
pub mod metrics;
pub mod svm;
pub mod tree;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::rng::SeedHierarchy;

pub use forest::{ForestConfig, RandomForest};
pub use lstm::{LstmConfig, LstmRegressor};
pub use metrics::r2_score;
pub use svm::{SvrConfig, SvrRegressor};
pub use tree::{DecisionTree, TreeConfig};

/// Uniform capability every strategy exposes.
///
/// Inputs are single-feature: one (possibly scaled) closing price per sample.
pub trait Regressor: Send {
    /// Human-readable name (e.g., "RandomForest").
    fn name(&self) -> &str;

    /// Fit on the training partition. `x` and `y` have equal, non-zero length.
    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), PredictError>;

    /// Predict one output per input. Fails if the model is not fitted.
    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, PredictError>;

    fn predict_one(&self, x: f64) -> Result<f64, PredictError> {
        self.predict(&[x])?
            .first()
            .copied()
            .ok_or_else(|| PredictError::ModelFitFailure("empty prediction".into()))
    }

    /// Coefficient of determination of the fitted model on `(x, y)`.
    fn score(&self, x: &[f64], y: &[f64]) -> Result<f64, PredictError> {
        let predicted = self.predict(x)?;
        r2_score(y, &predicted)
    }
}

pub(crate) fn not_fitted(name: &str) -> PredictError {
    PredictError::ModelFitFailure(format!("{name} used before fit"))
}

pub(crate) fn check_fit_input(name: &str, x: &[f64], y: &[f64]) -> Result<(), PredictError> {
    if x.is_empty() || x.len() != y.len() {
        return Err(PredictError::ModelFitFailure(format!(
            "{name}: need equal, non-empty inputs (got {} features, {} targets)",
            x.len(),
            y.len()
        )));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(PredictError::ModelFitFailure(format!(
            "{name}: non-finite training value"
        )));
    }
    Ok(())
}

/// Strategy identifier. Serializes to the wire names `SVM`, `DecisionTree`,
/// `RandomForest`, `LSTM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ModelKind {
    #[serde(rename = "SVM")]
    Svm,
    DecisionTree,
    #[default]
    RandomForest,
    #[serde(rename = "LSTM")]
    Lstm,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Svm,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
        ModelKind::Lstm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Svm => "SVM",
            ModelKind::DecisionTree => "DecisionTree",
            ModelKind::RandomForest => "RandomForest",
            ModelKind::Lstm => "LSTM",
        }
    }

    /// Strategy that will actually run for a requested id.
    ///
    /// Absent or unrecognized ids fall back to [`ModelKind::RandomForest`].
    pub fn resolve(requested: Option<&str>) -> ModelKind {
        match requested {
            None => ModelKind::default(),
            Some(id) => id.parse().unwrap_or_else(|_| {
                tracing::warn!(requested = id, "unknown model type, using RandomForest");
                ModelKind::default()
            }),
        }
    }

    /// Whether the strategy consumes min-max scaled input.
    pub fn uses_scaling(&self) -> bool {
        matches!(self, ModelKind::Svm | ModelKind::Lstm)
    }

    /// Whether confidence is a fixed constant instead of a computed score.
    pub fn is_recurrent(&self) -> bool {
        matches!(self, ModelKind::Lstm)
    }

    /// Minimum number of feature/target pairs the strategy accepts.
    ///
    /// Scored strategies need two samples in each partition for a defined
    /// coefficient of determination; with an 80/20 split that is 10 pairs.
    pub fn min_pairs(&self) -> usize {
        match self {
            ModelKind::Lstm => 5,
            _ => 10,
        }
    }

    /// Construct a fresh, unfitted model. Each request builds its own.
    pub fn build(&self, seeds: SeedHierarchy) -> Box<dyn Regressor> {
        match self {
            ModelKind::Svm => Box::new(SvrRegressor::new(SvrConfig::default())),
            ModelKind::DecisionTree => Box::new(DecisionTree::new(TreeConfig::default())),
            ModelKind::RandomForest => Box::new(RandomForest::new(Default::default(), seeds)),
            ModelKind::Lstm => Box::new(LstmRegressor::new(LstmConfig::default(), seeds)),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model type '{0}'")]
pub struct UnknownModel(pub String);

impl FromStr for ModelKind {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(id))
            .ok_or_else(|| UnknownModel(id.to_string()))
    }
}
