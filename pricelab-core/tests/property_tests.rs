//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Causal partitioning: train then test reconstructs the original order
//! 2. Scaler bounds: training min maps to 0.0 and max to 1.0
//! 3. Zero-variance safety: a constant training set scales to all zeros
//! 4. Recommendation dead zone: [-2, 2] is HOLD, outside is directional
//! 5. Determinism: repeated tree predictions are bit-identical

use chrono::NaiveDate;
use proptest::prelude::*;
use pricelab_core::domain::PriceSeries;
use pricelab_core::models::ModelKind;
use pricelab_core::pipeline::{normalize, partition, MinMaxScaler, Predictor, Recommendation};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, min_len..max_len)
}

fn arb_walk(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (50.0..500.0_f64, prop::collection::vec(-0.03..0.03_f64, min_len..max_len)).prop_map(
        |(start, steps)| {
            let mut price = start;
            steps
                .into_iter()
                .map(|r| {
                    price *= 1.0 + r;
                    price
                })
                .collect()
        },
    )
}

fn to_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), closes).unwrap()
}

// ── 1. Causal partitioning ───────────────────────────────────────────

proptest! {
    #[test]
    fn partition_preserves_chronology(closes in arb_closes(3, 400)) {
        let pairs = normalize(&to_series(&closes)).unwrap();
        let part = partition(&pairs).unwrap();

        prop_assert_eq!(part.train_x.len(), part.train_y.len());
        prop_assert_eq!(part.test_x.len(), part.test_y.len());
        prop_assert_eq!(part.train_x.len() + part.test_x.len(), pairs.len());
        prop_assert!(!part.train_x.is_empty());
        prop_assert!(!part.test_x.is_empty());

        let rebuilt: Vec<f64> = part.train_x.iter().chain(&part.test_x).copied().collect();
        prop_assert_eq!(rebuilt.as_slice(), pairs.features());
        let rebuilt_y: Vec<f64> = part.train_y.iter().chain(&part.test_y).copied().collect();
        prop_assert_eq!(rebuilt_y.as_slice(), pairs.targets());
    }
}

// ── 2. Scaler bounds ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn scaler_maps_extremes_to_unit_bounds(values in prop::collection::vec(-1e6..1e6_f64, 2..200)) {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assume!(max > min);

        let scaler = MinMaxScaler::fit(&values);
        prop_assert_eq!(scaler.transform_one(min), 0.0);
        prop_assert_eq!(scaler.transform_one(max), 1.0);
        for v in scaler.transform(&values) {
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }
}

// ── 3. Zero-variance safety ──────────────────────────────────────────

proptest! {
    #[test]
    fn constant_training_set_scales_to_zero(
        value in -1e6..1e6_f64,
        len in 1usize..100,
        probe in -1e6..1e6_f64,
    ) {
        let scaler = MinMaxScaler::fit(&vec![value; len]);
        for v in scaler.transform(&vec![value; len]) {
            prop_assert_eq!(v, 0.0);
        }
        let p = scaler.transform_one(probe);
        prop_assert_eq!(p, 0.0);
    }
}

// ── 4. Recommendation dead zone ──────────────────────────────────────

proptest! {
    #[test]
    fn dead_zone_is_hold(change in -2.0..=2.0_f64) {
        prop_assert_eq!(Recommendation::from_change(change), Recommendation::Hold);
    }

    #[test]
    fn outside_dead_zone_is_directional(magnitude in 2.0001..500.0_f64) {
        prop_assert_eq!(Recommendation::from_change(magnitude), Recommendation::Buy);
        prop_assert_eq!(Recommendation::from_change(-magnitude), Recommendation::Sell);
    }
}

#[test]
fn dead_zone_boundaries_are_hold() {
    assert_eq!(Recommendation::from_change(2.0), Recommendation::Hold);
    assert_eq!(Recommendation::from_change(-2.0), Recommendation::Hold);
}

// ── 5. Determinism ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn tree_predictions_are_reproducible(closes in arb_walk(12, 120), seed in any::<u64>()) {
        let series = to_series(&closes);
        let predictor = Predictor::new(seed);
        let a = predictor.predict_with("P", &series, ModelKind::DecisionTree);
        let b = predictor.predict_with("P", &series, ModelKind::DecisionTree);
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.predicted_price.to_bits(), b.predicted_price.to_bits());
                prop_assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
                prop_assert_eq!(a.recommendation, b.recommendation);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "one run failed and the other did not"),
        }
    }
}
