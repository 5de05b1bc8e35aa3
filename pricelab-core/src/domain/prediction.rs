//! PredictionResult: the record one prediction request produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ModelKind;
use crate::pipeline::Recommendation;

/// Result of one prediction request.
///
/// Built once by the predictor and never mutated afterwards. `model_type` is
/// the strategy that actually ran, which differs from the requested one when
/// the request named an unknown strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub symbol: String,
    /// Last close of the input series, rounded to cents.
    pub current_price: f64,
    /// One-step-ahead forecast, rounded to cents.
    pub predicted_price: f64,
    /// `(predicted - current) / current * 100`, rounded to 2 decimals.
    pub price_change_percent: f64,
    /// Confidence on a 0–100 scale, rounded to 1 decimal.
    pub confidence: f64,
    pub model_type: ModelKind,
    pub recommendation: Recommendation,
    pub timestamp: DateTime<Utc>,
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_cents() {
        assert_eq!(round_to(101.234, 2), 101.23);
        assert_eq!(round_to(101.235_1, 2), 101.24);
        assert_eq!(round_to(-2.345_1, 2), -2.35);
    }

    #[test]
    fn round_to_one_decimal() {
        assert_eq!(round_to(87.46, 1), 87.5);
        assert_eq!(round_to(0.04, 1), 0.0);
    }

    #[test]
    fn result_serializes_model_and_recommendation_names() {
        let result = PredictionResult {
            symbol: "AAPL".into(),
            current_price: 100.0,
            predicted_price: 103.0,
            price_change_percent: 3.0,
            confidence: 91.2,
            model_type: ModelKind::RandomForest,
            recommendation: Recommendation::Buy,
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["model_type"], "RandomForest");
        assert_eq!(json["recommendation"], "BUY");
    }
}
