//! Runner configuration, loaded from TOML.
//!
//! Every section has defaults, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [prediction]
//! seed = 42
//! period = "1y"
//! default_model = "RandomForest"
//!
//! [history]
//! path = "data/predictions.jsonl"
//! query_limit = 50
//!
//! [batch]
//! max_concurrency = 4
//! request_delay_ms = 250
//!
//! [provider]
//! kind = "yahoo"        # yahoo | csv | synthetic
//! csv_dir = "data/csv"
//! timeout_secs = 30
//! max_retries = 3
//!
//! [server]
//! bind = "127.0.0.1:5000"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pricelab_core::data::{
    CircuitBreaker, CsvProvider, DataError, LookbackPeriod, MarketDataProvider, SyntheticProvider,
    YahooProvider, YahooSettings,
};
use pricelab_core::models::ModelKind;
use pricelab_core::rng::DEFAULT_SEED;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub prediction: PredictionSettings,
    pub history: HistorySettings,
    pub batch: BatchSettings,
    pub provider: ProviderSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionSettings {
    /// Master seed for every stochastic strategy.
    pub seed: u64,
    /// Lookback requested from the market-data provider.
    pub period: LookbackPeriod,
    /// Strategy used when a request names none.
    pub default_model: ModelKind,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            period: LookbackPeriod::default(),
            default_model: ModelKind::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub path: PathBuf,
    /// Default number of records returned by a history query.
    pub query_limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/predictions.jsonl"),
            query_limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub max_concurrency: usize,
    pub request_delay_ms: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            request_delay_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub csv_dir: PathBuf,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            csv_dir: PathBuf::from("data/csv"),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl ProviderSettings {
    /// Construct the configured market-data provider.
    pub fn build(&self) -> Result<Box<dyn MarketDataProvider>, DataError> {
        Ok(match self.kind {
            ProviderKind::Yahoo => {
                let settings = YahooSettings {
                    timeout: Duration::from_secs(self.timeout_secs),
                    max_retries: self.max_retries,
                    ..YahooSettings::default()
                };
                let breaker = Arc::new(CircuitBreaker::default_provider());
                Box::new(YahooProvider::new(breaker, settings)?)
            }
            ProviderKind::Csv => Box::new(CsvProvider::new(self.csv_dir.clone())),
            ProviderKind::Synthetic => Box::new(SyntheticProvider::ending_today()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".into(),
        }
    }
}

impl RunnerConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "batch.max_concurrency must be at least 1".into(),
            ));
        }
        if self.history.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("history.path must not be empty".into()));
        }
        if self.history.query_limit == 0 {
            return Err(ConfigError::Invalid(
                "history.query_limit must be at least 1".into(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_secs must be at least 1".into(),
            ));
        }
        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server.bind '{}': {e}", self.server.bind)))
    }

    /// Content hash of the settings that determine a prediction's outcome.
    ///
    /// Two runs with equal fingerprints used the same seed, lookback, and
    /// default strategy.
    pub fn fingerprint(&self) -> String {
        let p = &self.prediction;
        let mut hasher = blake3::Hasher::new();
        hasher.update(&p.seed.to_le_bytes());
        hasher.update(p.period.as_str().as_bytes());
        hasher.update(b"\0");
        hasher.update(p.default_model.as_str().as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}
