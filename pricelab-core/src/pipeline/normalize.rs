//! Series normalizer: closes → (feature, next-close target) pairs.

use crate::domain::PriceSeries;
use crate::error::PredictError;

/// Parallel feature/target arrays. `targets[i]` is the close that followed
/// `features[i]`; the final close has no known successor and is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTargetPair {
    features: Vec<f64>,
    targets: Vec<f64>,
}

impl FeatureTargetPair {
    pub fn features(&self) -> &[f64] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Build feature/target pairs from a series of at least two points.
pub fn normalize(series: &PriceSeries) -> Result<FeatureTargetPair, PredictError> {
    if series.len() < 2 {
        return Err(PredictError::InsufficientData(format!(
            "need at least 2 prices to form a pair, got {}",
            series.len()
        )));
    }
    let closes = series.closes();
    Ok(FeatureTargetPair {
        features: closes[..closes.len() - 1].to_vec(),
        targets: closes[1..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), closes).unwrap()
    }

    #[test]
    fn targets_are_shifted_closes() {
        let pair = normalize(&series(&[1.0, 2.0, 4.0, 8.0])).unwrap();
        assert_eq!(pair.features(), &[1.0, 2.0, 4.0]);
        assert_eq!(pair.targets(), &[2.0, 4.0, 8.0]);
        assert_eq!(pair.len(), 3);
    }

    #[test]
    fn single_point_is_insufficient() {
        assert!(matches!(
            normalize(&series(&[5.0])),
            Err(PredictError::InsufficientData(_))
        ));
    }
}
