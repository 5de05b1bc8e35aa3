//! Turn raw provider rows into a valid PriceSeries.
//!
//! Providers hand over whatever the upstream returned. Rows with unusable
//! closes are dropped, rows are sorted by date, and when a date appears twice
//! the later row wins.

use super::provider::DataError;
use crate::domain::{PricePoint, PriceSeries};

/// Canonicalize raw rows. An empty result is returned as an empty series; the
/// caller decides whether that means "symbol not found".
pub fn canonicalize(mut rows: Vec<PricePoint>) -> Result<PriceSeries, DataError> {
    let before = rows.len();
    rows.retain(PricePoint::has_valid_close);
    let dropped = before - rows.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dropped rows with unusable closes");
    }

    // Stable sort keeps upstream order among equal dates, so the last
    // occurrence is the latest revision of that day.
    rows.sort_by_key(|p| p.date);
    let mut deduped: Vec<PricePoint> = Vec::with_capacity(rows.len());
    for row in rows {
        match deduped.last_mut() {
            Some(prev) if prev.date == row.date => *prev = row,
            _ => deduped.push(row),
        }
    }

    PriceSeries::new(deduped).map_err(|e| DataError::Validation(e.to_string()))
}
