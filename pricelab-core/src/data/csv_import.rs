//! CSV import provider: offline price history from `<dir>/<SYMBOL>.csv`.
//!
//! Expected header: `date,open,high,low,close,volume` with ISO dates. Extra
//! columns are ignored; rows with an unusable close are dropped during
//! canonicalization.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use super::canonicalize::canonicalize;
use super::period::LookbackPeriod;
use super::provider::{DataError, DataSource, FetchResult, MarketDataProvider};
use crate::domain::PricePoint;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

impl CsvRow {
    fn into_point(self) -> PricePoint {
        let close = self.close.unwrap_or(f64::NAN);
        PricePoint {
            date: self.date,
            open: self.open.unwrap_or(close),
            high: self.high.unwrap_or(close),
            low: self.low.unwrap_or(close),
            close,
            volume: self.volume.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(0.0) as u64,
        }
    }
}

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> Option<PathBuf> {
        // Symbols map straight to file names; anything path-like is rejected.
        if symbol.is_empty() || symbol.contains(['/', '\\']) || symbol.contains("..") {
            return None;
        }
        Some(self.dir.join(format!("{symbol}.csv")))
    }

    fn read_rows(path: &Path) -> Result<Vec<PricePoint>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize::<CsvRow>() {
            rows.push(record?.into_point());
        }
        Ok(rows)
    }
}

impl MarketDataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, symbol: &str, period: LookbackPeriod) -> Result<FetchResult, DataError> {
        let not_found = || DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        };
        let path = self.path_for(symbol).ok_or_else(not_found)?;
        if !path.is_file() {
            return Err(not_found());
        }

        let series = canonicalize(Self::read_rows(&path)?)?;
        let series = match series.last_date().and_then(|last| period.cutoff(last)) {
            Some(cutoff) => series.since(cutoff),
            None => series,
        };
        if series.is_empty() {
            return Err(not_found());
        }

        tracing::debug!(symbol, path = %path.display(), points = series.len(), "loaded csv history");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            series,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}
