//! Synthetic provider: deterministic random-walk history for offline runs.
//!
//! Each symbol gets its own walk seeded from BLAKE3 of the symbol name, so the
//! same symbol always yields the same closes. Only catalogue symbols are
//! served; anything else is reported as not found, like the live provider.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;

use super::catalogue;
use super::period::LookbackPeriod;
use super::provider::{DataError, DataSource, FetchResult, MarketDataProvider};
use crate::domain::{PricePoint, PriceSeries};
use crate::rng::SeedHierarchy;

/// Calendar days generated when the lookback is unbounded.
const MAX_SPAN_DAYS: i64 = 3652;

pub struct SyntheticProvider {
    end: NaiveDate,
    seeds: SeedHierarchy,
}

impl SyntheticProvider {
    /// Walks ending on `end` (inclusive, if it is a business day).
    pub fn new(end: NaiveDate) -> Self {
        Self {
            end,
            seeds: SeedHierarchy::default(),
        }
    }

    /// Walks ending today (UTC).
    pub fn ending_today() -> Self {
        Self::new(chrono::Utc::now().date_naive())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seeds = SeedHierarchy::new(seed);
        self
    }

    fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .collect()
    }

    fn generate(&self, symbol: &str, period: LookbackPeriod) -> Result<PriceSeries, DataError> {
        let start = period
            .cutoff(self.end)
            .unwrap_or(self.end - chrono::Duration::days(MAX_SPAN_DAYS));
        // The walk always starts at the same point regardless of lookback, so
        // shorter periods are suffixes of longer ones.
        let full = Self::business_days(self.end - chrono::Duration::days(MAX_SPAN_DAYS), self.end);
        let mut rng = self.seeds.rng_for(symbol, 0);
        let mut close: f64 = rng.gen_range(20.0..400.0);
        let drift: f64 = rng.gen_range(-0.0002..0.0008);
        let volatility: f64 = rng.gen_range(0.008..0.025);

        let mut points = Vec::new();
        for date in full {
            let shock: f64 = rng.gen_range(-1.0..1.0) * volatility;
            let volume = rng.gen_range(500_000..20_000_000);
            let open = close;
            close = (close * (1.0 + drift + shock)).max(0.01);
            if date < start {
                continue;
            }
            let spread = close * volatility * 0.5;
            points.push(PricePoint {
                date,
                open,
                high: open.max(close) + spread,
                low: (open.min(close) - spread).max(0.01),
                close,
                volume,
            });
        }

        PriceSeries::new(points).map_err(|e| DataError::Validation(e.to_string()))
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, period: LookbackPeriod) -> Result<FetchResult, DataError> {
        let info = catalogue::lookup(symbol).ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;
        let series = self.generate(info.symbol, period)?;
        Ok(FetchResult {
            symbol: info.symbol.to_string(),
            series,
            source: DataSource::Synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SyntheticProvider {
        SyntheticProvider::new(NaiveDate::from_ymd_opt(2024, 6, 28).unwrap())
    }

    #[test]
    fn deterministic_per_symbol() {
        let a = provider().fetch("AAPL", LookbackPeriod::OneYear).unwrap();
        let b = provider().fetch("AAPL", LookbackPeriod::OneYear).unwrap();
        let c = provider().fetch("MSFT", LookbackPeriod::OneYear).unwrap();
        assert_eq!(a.series, b.series);
        assert_ne!(a.series.closes(), c.series.closes());
    }

    #[test]
    fn weekdays_only() {
        let result = provider().fetch("KO", LookbackPeriod::ThreeMonths).unwrap();
        assert!(result
            .series
            .points()
            .iter()
            .all(|p| !matches!(p.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(result.series.len() > 55);
    }

    #[test]
    fn shorter_period_is_suffix_of_longer() {
        let year = provider().fetch("XOM", LookbackPeriod::OneYear).unwrap();
        let month = provider().fetch("XOM", LookbackPeriod::OneMonth).unwrap();
        let tail = &year.series.points()[year.series.len() - month.series.len()..];
        assert_eq!(tail, month.series.points());
    }

    #[test]
    fn unknown_symbol_not_found() {
        assert!(matches!(
            provider().fetch("NOTREAL", LookbackPeriod::OneYear),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn seed_changes_walk() {
        let a = provider().fetch("AAPL", LookbackPeriod::OneMonth).unwrap();
        let b = provider()
            .with_seed(7)
            .fetch("AAPL", LookbackPeriod::OneMonth)
            .unwrap();
        assert_ne!(a.series.closes(), b.series.closes());
    }
}
