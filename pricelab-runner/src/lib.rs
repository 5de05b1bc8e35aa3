//! PriceLab Runner: prediction service, history, batch runs, HTTP payloads.
//!
//! This crate builds on `pricelab-core` to provide:
//! - TOML configuration with per-section defaults and a settings fingerprint
//! - The prediction service (fetch, predict, record)
//! - JSONL prediction history
//! - Bounded-concurrency batch predictions
//! - HTTP request/response shapes and error-status mapping

pub mod api;
pub mod batch;
pub mod config;
pub mod history;
pub mod service;

pub use api::{status_for, ErrorBody, PredictRequest, PredictResponse, SymbolsQuery};
pub use batch::{run_batch, BatchConfig, BatchError, BatchItem, BatchSummary};
pub use config::{ConfigError, ProviderKind, RunnerConfig};
pub use history::{HistoryError, PredictionHistory, PredictionRecord};
pub use service::{PredictionService, ServiceError, SetupError};
