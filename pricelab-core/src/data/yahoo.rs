//! Yahoo Finance market-data provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API using its `range` vocabulary
//! (`1y`, `6mo`, ...). Handles rate limiting, retries with exponential backoff,
//! response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; the CSV provider is the offline fallback.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::canonicalize::canonicalize;
use super::circuit_breaker::CircuitBreaker;
use super::period::LookbackPeriod;
use super::provider::{DataError, DataSource, FetchResult, MarketDataProvider};
use crate::domain::{PricePoint, PriceSeries};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Transport settings for [`YahooProvider`].
#[derive(Debug, Clone)]
pub struct YahooSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    settings: YahooSettings,
}

impl YahooProvider {
    pub fn new(
        circuit_breaker: Arc<CircuitBreaker>,
        settings: YahooSettings,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            settings,
        })
    }

    fn chart_url(symbol: &str, period: LookbackPeriod) -> String {
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?range={period}&interval=1d&includeAdjustedClose=true"
        )
    }

    /// Parse a chart API body into a canonical series.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<PriceSeries, DataError> {
        let result = match resp.chart.result {
            Some(result) => result,
            None => {
                return Err(match resp.chart.error {
                    Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    },
                    Some(err) => DataError::ResponseFormatChanged(format!(
                        "{}: {}",
                        err.code, err.description
                    )),
                    None => DataError::ResponseFormatChanged("empty result with no error".into()),
                })
            }
        };

        let Some(data) = result.into_iter().next() else {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        };

        // A listed symbol with no trading history comes back without timestamps.
        let timestamps = data.timestamp.unwrap_or_default();
        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut rows = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            // Holidays come back as all-null rows; canonicalize drops them.
            let close = quote.close.get(i).copied().flatten().unwrap_or(f64::NAN);
            rows.push(PricePoint {
                date,
                open: quote.open.get(i).copied().flatten().unwrap_or(f64::NAN),
                high: quote.high.get(i).copied().flatten().unwrap_or(f64::NAN),
                low: quote.low.get(i).copied().flatten().unwrap_or(f64::NAN),
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }

        let series = canonicalize(rows)?;
        if series.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(series)
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        period: LookbackPeriod,
    ) -> Result<PriceSeries, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = Self::chart_url(symbol, period);
        let mut last_error = None;

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let delay = self.settings.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(symbol, attempt, ?delay, "retrying chart request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let chart: ChartResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
            })?;
            let series = Self::parse_response(symbol, chart)?;
            self.circuit_breaker.record_success();
            return Ok(series);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, period: LookbackPeriod) -> Result<FetchResult, DataError> {
        let series = self.fetch_with_retry(symbol, period)?;
        tracing::info!(symbol, period = %period, points = series.len(), "fetched chart data");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            series,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(symbol: &str, body: &str) -> Result<PriceSeries, DataError> {
        let resp: ChartResponse = serde_json::from_str(body).unwrap();
        YahooProvider::parse_response(symbol, resp)
    }

    #[test]
    fn url_uses_range_vocabulary() {
        let url = YahooProvider::chart_url("AAPL", LookbackPeriod::SixMonths);
        assert!(url.contains("/chart/AAPL?"));
        assert!(url.contains("range=6mo"));
        assert!(url.contains("interval=1d"));
    }

    #[test]
    fn parses_rows_and_skips_null_days() {
        let body = r#"{"chart":{"result":[{
            "timestamp":[1704205800,1704292200,1704378600],
            "indicators":{"quote":[{
                "open":[185.0,null,182.0],
                "high":[188.0,null,183.0],
                "low":[183.0,null,180.5],
                "close":[185.6,null,181.9],
                "volume":[82488700,null,58414500]
            }]}
        }],"error":null}}"#;
        let series = parse("AAPL", body).unwrap();
        assert_eq!(series.closes(), vec![185.6, 181.9]);
        assert_eq!(series.points()[0].volume, 82_488_700);
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(
            parse("ZZZZ", body),
            Err(DataError::SymbolNotFound { symbol }) if symbol == "ZZZZ"
        ));
    }

    #[test]
    fn empty_history_is_symbol_not_found() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(
            parse("NEW", body),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn other_errors_are_format_changes() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        assert!(matches!(
            parse("AAPL", body),
            Err(DataError::ResponseFormatChanged(_))
        ));
    }
}
