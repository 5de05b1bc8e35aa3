//! Confidence estimation from goodness-of-fit scores.

use crate::domain::round_to;

/// Fixed confidence (0–100) reported for the recurrent strategy, which is
/// not scored.
pub const RECURRENT_CONFIDENCE: f64 = 85.0;

/// Mean of train and test scores, clamped to `[0, 1]`.
pub fn confidence(train_score: f64, test_score: f64) -> f64 {
    ((train_score + test_score) / 2.0).clamp(0.0, 1.0)
}

/// Express a `[0, 1]` confidence on the 0–100 scale, one decimal.
pub fn to_percent(confidence: f64) -> f64 {
    round_to(confidence * 100.0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_scores() {
        assert!((confidence(0.9, 0.7) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn clamps_to_unit_interval() {
        assert_eq!(confidence(0.2, -3.0), 0.0);
        assert_eq!(confidence(1.0, 1.0), 1.0);
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(to_percent(0.87654), 87.7);
        assert_eq!(to_percent(0.0), 0.0);
    }
}
