//! Prediction orchestrator: price series + requested strategy → result.
//!
//! Steps, in order: reject an empty series (unknown symbol), build pairs,
//! resolve the strategy and check its minimum, partition, scale if the
//! strategy wants scaled input, fit, forecast from the latest close, score,
//! classify. Nothing is shared between calls; each builds its own model.

use chrono::Utc;

use super::confidence::{confidence, to_percent, RECURRENT_CONFIDENCE};
use super::normalize::normalize;
use super::partition::partition;
use super::recommendation::Recommendation;
use super::scaler::MinMaxScaler;
use crate::domain::{round_to, PredictionResult, PriceSeries};
use crate::error::PredictError;
use crate::models::ModelKind;
use crate::rng::{SeedHierarchy, DEFAULT_SEED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predictor {
    seeds: SeedHierarchy,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Predictor {
    pub fn new(seed: u64) -> Self {
        Self {
            seeds: SeedHierarchy::new(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seeds.master_seed()
    }

    /// Predict with a strategy named by its wire id. Absent or unknown ids
    /// run RandomForest; the result names the strategy that actually ran.
    pub fn predict(
        &self,
        symbol: &str,
        series: &PriceSeries,
        requested: Option<&str>,
    ) -> Result<PredictionResult, PredictError> {
        self.predict_with(symbol, series, ModelKind::resolve(requested))
    }

    pub fn predict_with(
        &self,
        symbol: &str,
        series: &PriceSeries,
        kind: ModelKind,
    ) -> Result<PredictionResult, PredictError> {
        let current_price = series.last_close().ok_or_else(|| PredictError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;

        let pairs = normalize(series)?;
        if pairs.len() < kind.min_pairs() {
            return Err(PredictError::InsufficientData(format!(
                "{kind} needs at least {} price pairs, got {}",
                kind.min_pairs(),
                pairs.len()
            )));
        }
        let split = partition(&pairs)?;
        if MinMaxScaler::fit(&split.train_y).is_degenerate() {
            return Err(PredictError::ModelFitFailure(
                "training targets are constant".into(),
            ));
        }

        let (train_x, test_x, input) = if kind.uses_scaling() {
            let scaler = MinMaxScaler::fit(&split.train_x);
            (
                scaler.transform(&split.train_x),
                scaler.transform(&split.test_x),
                scaler.transform_one(current_price),
            )
        } else {
            (split.train_x.clone(), split.test_x.clone(), current_price)
        };

        let mut model = kind.build(self.seeds);
        model.fit(&train_x, &split.train_y)?;
        let predicted_price = model.predict_one(input)?;
        if !predicted_price.is_finite() {
            return Err(PredictError::ModelFitFailure(format!(
                "{kind} produced a non-finite forecast"
            )));
        }

        let confidence_percent = if kind.is_recurrent() {
            RECURRENT_CONFIDENCE
        } else {
            let train_score = model.score(&train_x, &split.train_y)?;
            let test_score = model.score(&test_x, &split.test_y)?;
            to_percent(confidence(train_score, test_score))
        };

        let change = (predicted_price - current_price) / current_price * 100.0;
        let recommendation = Recommendation::from_change(change);

        tracing::info!(
            symbol,
            model = %kind,
            current_price,
            predicted_price,
            change,
            %recommendation,
            "prediction complete"
        );

        Ok(PredictionResult {
            symbol: symbol.to_string(),
            current_price: round_to(current_price, 2),
            predicted_price: round_to(predicted_price, 2),
            price_change_percent: round_to(change, 2),
            confidence: confidence_percent,
            model_type: kind,
            recommendation,
            timestamp: Utc::now(),
        })
    }
}

/// Predict with the default seed.
pub fn predict(
    symbol: &str,
    series: &PriceSeries,
    requested: Option<&str>,
) -> Result<PredictionResult, PredictError> {
    Predictor::default().predict(symbol, series, requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), closes).unwrap()
    }

    #[test]
    fn below_strategy_minimum_is_insufficient() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        // 9 pairs: enough for LSTM, not for the scored strategies.
        let err = predict("T", &series(&closes), Some("DecisionTree")).unwrap_err();
        assert!(matches!(err, PredictError::InsufficientData(_)));
    }

    #[test]
    fn constant_prices_fail_to_fit() {
        let closes = vec![50.0; 30];
        let err = predict("FLAT", &series(&closes), Some("SVM")).unwrap_err();
        assert!(matches!(err, PredictError::ModelFitFailure(_)));
    }

    #[test]
    fn flat_recent_closes_still_predict() {
        // The test partition sees only the flat tail.
        let mut closes: Vec<f64> = (0..48)
            .map(|i| 120.0 + i as f64 * 0.2 + (i as f64 * 0.37).sin() * 4.0)
            .collect();
        closes.extend(std::iter::repeat(130.0).take(13));
        for kind in ["RandomForest", "DecisionTree", "SVM"] {
            let result = predict("FLAT", &series(&closes), Some(kind)).unwrap();
            assert!(result.predicted_price.is_finite(), "{kind}");
            assert!((0.0..=100.0).contains(&result.confidence), "{kind}");
        }
    }

    #[test]
    fn result_is_rounded() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.731 + (i as f64).sin()).collect();
        let result = predict("R", &series(&closes), Some("DecisionTree")).unwrap();
        assert_eq!(result.current_price, round_to(result.current_price, 2));
        assert_eq!(result.predicted_price, round_to(result.predicted_price, 2));
        assert_eq!(result.price_change_percent, round_to(result.price_change_percent, 2));
        assert_eq!(result.confidence, round_to(result.confidence, 1));
        assert!((0.0..=100.0).contains(&result.confidence));
    }

    #[test]
    fn seed_is_exposed() {
        assert_eq!(Predictor::new(7).seed(), 7);
        assert_eq!(Predictor::default().seed(), DEFAULT_SEED);
    }
}
