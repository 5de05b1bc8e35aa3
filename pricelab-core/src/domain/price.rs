//! PricePoint and PriceSeries: the market data a prediction is computed from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV point for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    /// A point is usable when its close is a finite, strictly positive number.
    ///
    /// Open/high/low are carried for reference only; the pipeline reads closes.
    pub fn has_valid_close(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Violations of the PriceSeries invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("dates must be strictly increasing: {previous} is followed by {next}")]
    NonIncreasingDate { previous: NaiveDate, next: NaiveDate },

    #[error("close on {date} must be finite and > 0, got {close}")]
    InvalidClose { date: NaiveDate, close: f64 },
}

/// Chronologically ordered price history.
///
/// Invariants (checked in [`PriceSeries::new`]): dates strictly increasing,
/// no duplicates, every close finite and > 0. An empty series is valid; it is
/// how an unknown symbol reaches the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = SeriesError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for point in &points {
            if !point.has_valid_close() {
                return Err(SeriesError::InvalidClose {
                    date: point.date,
                    close: point.close,
                });
            }
        }
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NonIncreasingDate {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Build a series from bare closes on consecutive calendar days.
    ///
    /// Used by tests and the synthetic provider; OHLC are all set to the close.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self, SeriesError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 0,
            })
            .collect();
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Most recent point, if any.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.last().map(|p| p.close)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last().map(|p| p.date)
    }

    /// Keep only points dated on or after `cutoff`.
    pub fn since(self, cutoff: NaiveDate) -> Self {
        let points = self.points.into_iter().filter(|p| p.date >= cutoff).collect();
        Self { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn point(day: u32, close: f64) -> PricePoint {
        PricePoint {
            date: date(day),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn accepts_ordered_positive_series() {
        let series = PriceSeries::new(vec![point(2, 100.0), point(3, 101.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_close(), Some(101.0));
        assert_eq!(series.closes(), vec![100.0, 101.0]);
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = PriceSeries::new(vec![point(2, 100.0), point(2, 101.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonIncreasingDate { .. }));
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let err = PriceSeries::new(vec![point(3, 100.0), point(2, 101.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonIncreasingDate { .. }));
    }

    #[test]
    fn rejects_non_positive_and_nan_closes() {
        assert!(PriceSeries::new(vec![point(2, 0.0)]).is_err());
        assert!(PriceSeries::new(vec![point(2, -1.0)]).is_err());
        assert!(PriceSeries::new(vec![point(2, f64::NAN)]).is_err());
    }

    #[test]
    fn empty_series_is_valid() {
        let series = PriceSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.last_close(), None);
    }

    #[test]
    fn from_closes_assigns_consecutive_dates() {
        let series = PriceSeries::from_closes(date(1), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.first_date(), Some(date(1)));
        assert_eq!(series.last_date(), Some(date(3)));
    }

    #[test]
    fn since_trims_leading_points() {
        let series = PriceSeries::from_closes(date(1), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let trimmed = series.since(date(3));
        assert_eq!(trimmed.closes(), vec![3.0, 4.0]);
    }

    #[test]
    fn deserialize_checks_invariants() {
        let ordered = serde_json::to_string(&vec![point(2, 100.0), point(3, 101.0)]).unwrap();
        let series: PriceSeries = serde_json::from_str(&ordered).unwrap();
        assert_eq!(series.closes(), vec![100.0, 101.0]);

        let reversed = serde_json::to_string(&vec![point(3, 100.0), point(2, 101.0)]).unwrap();
        assert!(serde_json::from_str::<PriceSeries>(&reversed).is_err());

        let zero_close = serde_json::to_string(&vec![point(2, 0.0)]).unwrap();
        assert!(serde_json::from_str::<PriceSeries>(&zero_close).is_err());
    }

    #[test]
    fn point_serialization_roundtrip() {
        let p = point(5, 42.5);
        let json = serde_json::to_string(&p).unwrap();
        let back: PricePoint = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
