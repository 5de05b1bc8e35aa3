//! Goodness-of-fit metrics.

use crate::error::PredictError;

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// Constant targets score 1.0 when every prediction matches them exactly and
/// 0.0 otherwise. Fewer than two samples is a [`PredictError::ModelFitFailure`].
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Result<f64, PredictError> {
    if actual.len() != predicted.len() {
        return Err(PredictError::ModelFitFailure(format!(
            "r2: length mismatch ({} vs {})",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.len() < 2 {
        return Err(PredictError::ModelFitFailure(
            "r2: need at least two samples".into(),
        ));
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    let score = 1.0 - ss_res / ss_tot;
    if !score.is_finite() {
        return Err(PredictError::ModelFitFailure("r2: non-finite score".into()));
    }
    Ok(score)
}
