//! End-to-end tests for the prediction pipeline.
//!
//! Covers:
//! 1. Determinism of every non-recurrent strategy
//! 2. Unknown strategy ids fall back to RandomForest
//! 3. A steadily rising series forecasts upward; fast compound growth yields a BUY
//! 4. Length-1 series are insufficient; empty series are unknown symbols
//! 5. The recurrent strategy reports its fixed confidence

use chrono::NaiveDate;
use pricelab_core::domain::PriceSeries;
use pricelab_core::models::ModelKind;
use pricelab_core::pipeline::{predict, Predictor, Recommendation, RECURRENT_CONFIDENCE};
use pricelab_core::PredictError;

// ── Helpers ──────────────────────────────────────────────────────────

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(start(), closes).unwrap()
}

/// Trend plus a deterministic wobble, so no strategy sees constant targets.
fn wobbly(n: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..n)
        .map(|i| 150.0 + i as f64 * 0.2 + (i as f64 * 0.37).sin() * 4.0)
        .collect();
    series(&closes)
}

// ── Determinism ──────────────────────────────────────────────────────

#[test]
fn non_recurrent_strategies_are_deterministic() {
    let data = wobbly(120);
    for kind in [ModelKind::Svm, ModelKind::DecisionTree, ModelKind::RandomForest] {
        let first = Predictor::new(42).predict_with("DET", &data, kind).unwrap();
        let second = Predictor::new(42).predict_with("DET", &data, kind).unwrap();
        assert_eq!(
            first.predicted_price.to_bits(),
            second.predicted_price.to_bits(),
            "{kind} forecast differs between runs"
        );
        assert_eq!(
            first.confidence.to_bits(),
            second.confidence.to_bits(),
            "{kind} confidence differs between runs"
        );
    }
}

// ── Strategy selection ───────────────────────────────────────────────

#[test]
fn unknown_strategy_runs_random_forest() {
    let closes: Vec<f64> = (0..300).map(|i| 100.0 + i as f64).collect();
    let result = predict("ASC", &series(&closes), Some("Unknown")).unwrap();
    assert_eq!(result.model_type, ModelKind::RandomForest);
    assert_eq!(
        serde_json::to_value(result.model_type).unwrap(),
        serde_json::json!("RandomForest")
    );
}

#[test]
fn absent_strategy_runs_random_forest() {
    let result = predict("DEF", &wobbly(60), None).unwrap();
    assert_eq!(result.model_type, ModelKind::RandomForest);
}

#[test]
fn every_strategy_reports_itself() {
    let data = wobbly(40);
    for kind in ModelKind::ALL {
        let result = predict("ALL", &data, Some(kind.as_str())).unwrap();
        assert_eq!(result.model_type, kind);
        assert!(result.predicted_price.is_finite());
        assert!((0.0..=100.0).contains(&result.confidence));
    }
}

// ── End-to-end scenario ──────────────────────────────────────────────

#[test]
fn linear_rise_forecasts_upward() {
    // One unit per step is ~0.3% near the end, below the BUY threshold.
    let closes: Vec<f64> = (0..252).map(|i| 100.0 + i as f64).collect();
    let result = predict("UP", &series(&closes), Some("RandomForest")).unwrap();

    assert_eq!(result.model_type, ModelKind::RandomForest);
    assert_eq!(result.current_price, 351.0);
    assert!(result.predicted_price >= result.current_price);
    assert!(result.price_change_percent > 0.0);
    assert!((0.0..=100.0).contains(&result.confidence));
}

#[test]
fn compound_rise_recommends_buy() {
    // 2.5% growth per step: the forecast continues the trend past the
    // training range and clears the BUY threshold.
    let closes: Vec<f64> = (0..252).map(|i| 100.0 * 1.025f64.powi(i)).collect();
    let data = series(&closes);
    let result = predict("UP", &data, Some("RandomForest")).unwrap();

    assert_eq!(result.model_type, ModelKind::RandomForest);
    assert_eq!(result.current_price, (closes[251] * 100.0).round() / 100.0);
    assert!(result.predicted_price >= result.current_price);
    assert!(result.price_change_percent > 0.0);
    assert_eq!(result.recommendation, Recommendation::Buy);
    assert!((0.0..=100.0).contains(&result.confidence));
}

#[test]
fn falling_series_recommends_sell() {
    let closes: Vec<f64> = (0..120).map(|i| 500.0 * 0.97f64.powi(i)).collect();
    let result = predict("DOWN", &series(&closes), Some("DecisionTree")).unwrap();
    assert!(result.price_change_percent < -2.0);
    assert_eq!(result.recommendation, Recommendation::Sell);
}

// ── Failures ─────────────────────────────────────────────────────────

#[test]
fn single_point_is_insufficient_data() {
    let err = predict("ONE", &series(&[123.45]), None).unwrap_err();
    assert!(matches!(err, PredictError::InsufficientData(_)));
}

#[test]
fn empty_series_is_symbol_not_found() {
    let err = predict("ZZZZ", &PriceSeries::empty(), Some("SVM")).unwrap_err();
    assert!(matches!(err, PredictError::SymbolNotFound { ref symbol } if symbol == "ZZZZ"));
}

// ── Recurrent strategy ───────────────────────────────────────────────

#[test]
fn lstm_reports_fixed_confidence() {
    let result = predict("RNN", &wobbly(30), Some("LSTM")).unwrap();
    assert_eq!(result.model_type, ModelKind::Lstm);
    assert_eq!(result.confidence, RECURRENT_CONFIDENCE);
    assert!(result.predicted_price > 0.0);
}

#[test]
fn lstm_accepts_short_history() {
    // Five pairs is the recurrent minimum.
    let closes = [100.0, 101.0, 99.5, 102.0, 103.0, 102.5];
    let result = predict("SHORT", &series(&closes), Some("LSTM")).unwrap();
    assert_eq!(result.model_type, ModelKind::Lstm);
}
