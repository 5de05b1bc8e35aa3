//! Market data: providers, lookback periods, canonicalization, symbol catalogue.

pub mod canonicalize;
pub mod catalogue;
pub mod circuit_breaker;
pub mod csv_import;
pub mod period;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use canonicalize::canonicalize;
pub use catalogue::{SectorSummary, SymbolInfo};
pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use period::LookbackPeriod;
pub use provider::{DataError, DataSource, FetchResult, MarketDataProvider};
pub use synthetic::SyntheticProvider;
pub use yahoo::{YahooProvider, YahooSettings};
