//! Market-data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! files, synthetic walks) so the service can swap implementations and tests
//! can run offline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::period::LookbackPeriod;
use crate::domain::PriceSeries;

/// Structured error types for market-data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("invalid lookback period '{0}'")]
    InvalidPeriod(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("data error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub series: PriceSeries,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Source of daily price history.
///
/// `fetch` returns a chronologically ordered series or
/// [`DataError::SymbolNotFound`]. Providers never retry on behalf of the
/// caller beyond their own transport-level policy.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for `symbol` covering the trailing `period`.
    fn fetch(&self, symbol: &str, period: LookbackPeriod) -> Result<FetchResult, DataError>;

    /// Whether the provider is currently accepting requests.
    fn is_available(&self) -> bool {
        true
    }
}
