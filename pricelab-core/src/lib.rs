//! PriceLab Core: price-series domain, market-data providers, prediction pipeline.
//!
//! This crate contains the prediction engine:
//! - Domain types (price points and series, prediction results)
//! - Market-data provider boundary (Yahoo chart API, CSV import, synthetic walks)
//! - Symbol catalogue
//! - Series normalization, chronological partitioning, min-max scaling
//! - Model strategy registry (SVR, decision tree, random forest, stacked LSTM)
//! - Confidence estimation and the BUY / SELL / HOLD rule
//! - Deterministic seed hierarchy

pub mod data;
pub mod domain;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod rng;

pub use error::{ErrorClass, PredictError};
