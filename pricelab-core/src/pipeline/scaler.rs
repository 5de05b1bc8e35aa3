//! Min-max scaler fitted once on the training partition.

use serde::{Deserialize, Serialize};

/// Fitted min-max bounds. Refitting means building a new scaler; the bounds
/// of an existing one never change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    /// Fit bounds on `values`. An empty slice yields the degenerate `[0, 0]`.
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { min: 0.0, max: 0.0 };
        }
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        Self { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// True when the fitted values were all identical.
    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// `(v - min) / (max - min)`; every value maps to 0.0 when degenerate.
    pub fn transform_one(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.transform_one(*v)).collect()
    }

    pub fn inverse_one(&self, scaled: f64) -> f64 {
        scaled * (self.max - self.min) + self.min
    }

    pub fn inverse_transform(&self, scaled: &[f64]) -> Vec<f64> {
        scaled.iter().map(|v| self.inverse_one(*v)).collect()
    }
}
